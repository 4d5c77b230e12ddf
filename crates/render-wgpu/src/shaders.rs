/// WGSL shader for lit surfaces and the blended shadow decal.
///
/// Light slots: 0 directional, 1 spot, 2 point. A slot with zero intensity is
/// skipped. Shadow lookups use a comparison sampler with a square PCF kernel.
pub const SCENE_SHADER: &str = r#"
struct Light {
    position: vec4<f32>,
    direction: vec4<f32>,
    color: vec4<f32>,
    shadow: vec4<f32>,
    attenuation: vec4<f32>,
};

struct SceneUniforms {
    view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
    ambient: vec4<f32>,
    lights: array<Light, 3>,
    directional_vp: mat4x4<f32>,
    spot_vp: mat4x4<f32>,
    point_vp: array<mat4x4<f32>, 6>,
};

struct ObjectUniforms {
    model: mat4x4<f32>,
    color: vec4<f32>,
    material: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> scene: SceneUniforms;
@group(0) @binding(1)
var directional_map: texture_depth_2d;
@group(0) @binding(2)
var spot_map: texture_depth_2d;
@group(0) @binding(3)
var point_map: texture_depth_2d_array;
@group(0) @binding(4)
var shadow_sampler: sampler_comparison;

@group(1) @binding(0)
var<uniform> obj: ObjectUniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    let world_pos = obj.model * vec4<f32>(vertex.position, 1.0);

    var out: VertexOutput;
    out.clip_position = scene.view_proj * world_pos;
    out.world_pos = world_pos.xyz;
    out.world_normal = normalize((obj.model * vec4<f32>(vertex.normal, 0.0)).xyz);
    out.uv = vertex.uv;
    return out;
}

// Light clip space to (u, v, depth). w < 0 marks a point behind the light.
fn shadow_coords(light_vp: mat4x4<f32>, world_pos: vec3<f32>) -> vec4<f32> {
    let clip = light_vp * vec4<f32>(world_pos, 1.0);
    if clip.w <= 0.0 {
        return vec4<f32>(0.0, 0.0, 0.0, -1.0);
    }
    let ndc = clip.xyz / clip.w;
    return vec4<f32>(ndc.x * 0.5 + 0.5, -ndc.y * 0.5 + 0.5, ndc.z, 1.0);
}

fn outside_map(c: vec4<f32>) -> bool {
    return c.w < 0.0
        || c.x < 0.0 || c.x > 1.0
        || c.y < 0.0 || c.y > 1.0
        || c.z < 0.0 || c.z > 1.0;
}

fn pcf(depth_map: texture_depth_2d, c: vec4<f32>, params: vec4<f32>) -> f32 {
    let radius = i32(round(params.z));
    var lit = 0.0;
    var taps = 0.0;
    for (var y = -radius; y <= radius; y += 1) {
        for (var x = -radius; x <= radius; x += 1) {
            let offset = vec2<f32>(f32(x), f32(y)) * params.w;
            lit += textureSampleCompareLevel(depth_map, shadow_sampler, c.xy + offset, c.z - params.y);
            taps += 1.0;
        }
    }
    return lit / taps;
}

fn directional_shadow(world_pos: vec3<f32>) -> f32 {
    let params = scene.lights[0].shadow;
    if params.x < 0.5 {
        return 1.0;
    }
    let c = shadow_coords(scene.directional_vp, world_pos);
    if outside_map(c) {
        return 1.0;
    }
    return pcf(directional_map, c, params);
}

fn spot_shadow(world_pos: vec3<f32>) -> f32 {
    let params = scene.lights[1].shadow;
    if params.x < 0.5 {
        return 1.0;
    }
    let c = shadow_coords(scene.spot_vp, world_pos);
    if outside_map(c) {
        return 1.0;
    }
    return pcf(spot_map, c, params);
}

// Face order +X, -X, +Y, -Y, +Z, -Z.
fn point_face(d: vec3<f32>) -> i32 {
    let a = abs(d);
    if a.x >= a.y && a.x >= a.z {
        return select(1, 0, d.x >= 0.0);
    }
    if a.y >= a.z {
        return select(3, 2, d.y >= 0.0);
    }
    return select(5, 4, d.z >= 0.0);
}

fn point_shadow(world_pos: vec3<f32>) -> f32 {
    let light = scene.lights[2];
    let params = light.shadow;
    if params.x < 0.5 {
        return 1.0;
    }
    let face = point_face(world_pos - light.position.xyz);
    let c = shadow_coords(scene.point_vp[face], world_pos);
    if outside_map(c) {
        return 1.0;
    }
    let radius = i32(round(params.z));
    var lit = 0.0;
    var taps = 0.0;
    for (var y = -radius; y <= radius; y += 1) {
        for (var x = -radius; x <= radius; x += 1) {
            let offset = vec2<f32>(f32(x), f32(y)) * params.w;
            lit += textureSampleCompareLevel(point_map, shadow_sampler, c.xy + offset, face, c.z - params.y);
            taps += 1.0;
        }
    }
    return lit / taps;
}

fn distance_falloff(d: f32, range: f32, decay: f32) -> f32 {
    var falloff = 1.0 / max(pow(max(d, 1e-4), decay), 0.01);
    if range > 0.0 {
        let r = clamp(1.0 - pow(d / range, 4.0), 0.0, 1.0);
        falloff *= r * r;
    }
    return falloff;
}

fn shade(n: vec3<f32>, v: vec3<f32>, l: vec3<f32>, base: vec3<f32>) -> vec3<f32> {
    let ndl = max(dot(n, l), 0.0);
    if ndl <= 0.0 {
        return vec3<f32>(0.0);
    }
    let roughness = clamp(obj.material.x, 0.04, 1.0);
    let metalness = clamp(obj.material.y, 0.0, 1.0);
    let h = normalize(l + v);
    let shininess = mix(256.0, 2.0, roughness);
    let f0 = mix(vec3<f32>(0.04), base, metalness);
    let specular = f0 * pow(max(dot(n, h), 0.0), shininess) * (1.0 - roughness * 0.5);
    let diffuse = base * (1.0 - metalness);
    return (diffuse + specular) * ndl;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let n = normalize(in.world_normal);
    let v = normalize(scene.camera_pos.xyz - in.world_pos);
    let base = obj.color.rgb;
    let receives = obj.material.z > 0.5;
    let metalness = clamp(obj.material.y, 0.0, 1.0);

    var color = scene.ambient.rgb * base * (1.0 - metalness);

    let sun = scene.lights[0];
    if sun.position.w > 0.0 {
        var lit = 1.0;
        if receives {
            lit = directional_shadow(in.world_pos);
        }
        color += shade(n, v, -sun.direction.xyz, base) * sun.color.rgb * sun.position.w * lit;
    }

    let spot = scene.lights[1];
    if spot.position.w > 0.0 {
        let to_light = spot.position.xyz - in.world_pos;
        let d = length(to_light);
        let l = to_light / max(d, 1e-4);
        let cos_angle = dot(-l, spot.direction.xyz);
        let width = max(spot.attenuation.y - spot.direction.w, 1e-4);
        let t = clamp((cos_angle - spot.direction.w) / width, 0.0, 1.0);
        let cone = t * t * (3.0 - 2.0 * t);
        if cone > 0.0 {
            var lit = 1.0;
            if receives {
                lit = spot_shadow(in.world_pos);
            }
            let falloff = distance_falloff(d, spot.color.w, spot.attenuation.x);
            color += shade(n, v, l, base) * spot.color.rgb * spot.position.w * cone * falloff * lit;
        }
    }

    let bulb = scene.lights[2];
    if bulb.position.w > 0.0 {
        let to_light = bulb.position.xyz - in.world_pos;
        let d = length(to_light);
        let l = to_light / max(d, 1e-4);
        var lit = 1.0;
        if receives {
            lit = point_shadow(in.world_pos);
        }
        let falloff = distance_falloff(d, bulb.color.w, bulb.attenuation.x);
        color += shade(n, v, l, base) * bulb.color.rgb * bulb.position.w * falloff * lit;
    }

    return vec4<f32>(color, 1.0);
}

// Radial blob: full opacity at the center, fading to nothing at the rim.
@fragment
fn fs_decal(in: VertexOutput) -> @location(0) vec4<f32> {
    let r = length(in.uv - vec2<f32>(0.5)) * 2.0;
    let falloff = 1.0 - smoothstep(0.0, 1.0, r);
    return vec4<f32>(obj.color.rgb, obj.color.a * falloff);
}
"#;

/// WGSL shader for the depth-only shadow pass.
pub const SHADOW_SHADER: &str = r#"
struct ShadowPass {
    view_proj: mat4x4<f32>,
};

struct ObjectUniforms {
    model: mat4x4<f32>,
    color: vec4<f32>,
    material: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> light: ShadowPass;

@group(1) @binding(0)
var<uniform> obj: ObjectUniforms;

@vertex
fn vs_shadow(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return light.view_proj * obj.model * vec4<f32>(position, 1.0);
}
"#;

/// WGSL shader for shadow frustum helpers.
pub const LINE_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct LineVertex {
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
};

struct LineOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_line(vertex: LineVertex) -> LineOutput {
    var out: LineOutput;
    out.clip_position = uniforms.view_proj * vec4<f32>(vertex.position, 1.0);
    out.color = vertex.color;
    return out;
}

@fragment
fn fs_line(in: LineOutput) -> @location(0) vec4<f32> {
    return in.color;
}
"#;
