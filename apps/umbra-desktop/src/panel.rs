use egui::Context as EguiContext;
use glam::Vec3;
use umbra_kernel::{LightKind, Material, Scene};
use umbra_render::OrbitCamera;
use umbra_tools::{SceneInspector, ShadowStatus};

/// Debug panel state that is not part of the scene.
#[derive(Debug, Default)]
pub struct PanelState {
    pub visible: bool,
    pub elapsed_time: f32,
    pub frames: u64,
}

/// Draw the debug panel. Edits are applied to the scene as whole values.
pub fn draw(ctx: &EguiContext, panel: &PanelState, scene: &mut Scene, camera: &OrbitCamera) {
    if !panel.visible {
        return;
    }

    let summary = SceneInspector::summary(scene, panel.elapsed_time);

    egui::SidePanel::left("debug_panel")
        .default_width(280.0)
        .show(ctx, |ui| {
            ui.heading("Umbra");
            ui.separator();
            ui.label(format!(
                "Frame: {}  t={:.2}s",
                panel.frames, summary.elapsed_time
            ));
            ui.label(format!(
                "Sphere: ({:.2}, {:.2}, {:.2})",
                summary.sphere.x, summary.sphere.y, summary.sphere.z
            ));
            ui.label(format!("Decal opacity: {:.3}", summary.decal_opacity));
            let eye = camera.eye();
            ui.label(format!("Camera: ({:.1}, {:.1}, {:.1})", eye.x, eye.y, eye.z));
            ui.separator();

            ui.heading("Lights");
            for info in &summary.lights {
                egui::CollapsingHeader::new(info.kind.name())
                    .default_open(false)
                    .show(ui, |ui| {
                        if let ShadowStatus::Disabled(reason) = &info.shadow {
                            ui.colored_label(egui::Color32::YELLOW, format!("shadow off: {reason}"));
                        }
                        light_controls(ui, scene, info.kind);
                    });
            }
            ui.horizontal(|ui| {
                if ui.button("Show helpers").clicked() {
                    scene.lights.set_helpers_visible(true);
                }
                if ui.button("Hide helpers").clicked() {
                    scene.lights.set_helpers_visible(false);
                }
            });

            ui.separator();
            ui.heading("Material");
            material_controls(ui, scene);

            ui.separator();
            ui.small("F1: Toggle panel | LMB: Orbit | Wheel: Zoom");
        });
}

fn light_controls(ui: &mut egui::Ui, scene: &mut Scene, kind: LightKind) {
    // Edit a copy so the rig only ever sees complete lights.
    let Some(mut light) = scene.lights.get(kind).copied() else {
        return;
    };
    let before = light;

    ui.add(egui::Slider::new(&mut light.intensity, 0.0..=1.0).text("intensity"));

    if kind != LightKind::Ambient {
        let mut pos = light.transform.position.to_array();
        ui.label("Position:");
        ui.horizontal(|ui| {
            for (value, prefix) in pos.iter_mut().zip(["X: ", "Y: ", "Z: "]) {
                ui.add(egui::DragValue::new(value).prefix(prefix).speed(0.05));
            }
        });
        light.transform.position = Vec3::from_array(pos);
    }

    if let Some(shadow) = light.shadow_mut() {
        ui.checkbox(&mut shadow.helper_visible, "Shadow helper");
        ui.horizontal(|ui| {
            ui.add(
                egui::DragValue::new(&mut shadow.near)
                    .prefix("near: ")
                    .speed(0.05),
            );
            ui.add(egui::DragValue::new(&mut shadow.far).prefix("far: ").speed(0.05));
        });
        ui.add(egui::Slider::new(&mut shadow.radius, 0.0..=10.0).text("softness"));
    }

    if light != before {
        scene.lights.set(light);
    }
}

fn material_controls(ui: &mut egui::Ui, scene: &mut Scene) {
    let id = scene.standard_material_id();
    let Some(Material::Standard {
        color,
        mut roughness,
        mut metalness,
    }) = scene.material(id).copied()
    else {
        return;
    };
    let old = (roughness, metalness);
    ui.add(egui::Slider::new(&mut roughness, 0.0..=1.0).text("roughness"));
    ui.add(egui::Slider::new(&mut metalness, 0.0..=1.0).text("metalness"));
    if (roughness, metalness) != old {
        scene.set_material(
            id,
            Material::Standard {
                color,
                roughness,
                metalness,
            },
        );
    }
}
