/// WGSL shader for the instanced hex grid.
///
/// Each cell is outlined with a signed-distance hexagon; the fill samples the
/// base map until `map_ready` is set, then the tile atlas layer under the
/// fragment. Image row 0 maps to the smallest world z.
pub const HEX_SHADER: &str = r#"
struct ViewUniforms {
    view_proj: mat4x4<f32>,
};

struct HexMaterial {
    outline_color: vec3<f32>,
    inner_radius: f32,
    world_size: vec3<f32>,
    outline_width: f32,
    map_ready: f32,
    tile_span: f32,
    _pad: vec2<f32>,
};

@group(0) @binding(0)
var<uniform> view: ViewUniforms;
@group(0) @binding(1)
var<uniform> material: HexMaterial;
@group(0) @binding(2)
var base_map: texture_2d<f32>;
@group(0) @binding(3)
var atlas: texture_2d_array<f32>;
@group(0) @binding(4)
var map_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
};

struct InstanceInput {
    @location(1) model_0: vec4<f32>,
    @location(2) model_1: vec4<f32>,
    @location(3) model_2: vec4<f32>,
    @location(4) model_3: vec4<f32>,
    @location(5) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) local_pos: vec3<f32>,
    @location(2) color: vec4<f32>,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let world_pos = model * vec4<f32>(vertex.position, 1.0);

    var out: VertexOutput;
    out.clip_position = view.view_proj * world_pos;
    out.world_pos = world_pos.xyz;
    out.local_pos = vertex.position;
    out.color = instance.color;
    return out;
}

// Distance to a pointy-top hexagon of the material's inner radius.
fn hex_distance(p_in: vec2<f32>) -> f32 {
    let s = vec2<f32>(1.0, 1.7320508);
    let p = abs(p_in);
    return max(dot(p, s * 0.5), p.x) - material.inner_radius;
}

fn atlas_uv(world_pos: vec3<f32>) -> vec3<f32> {
    let span = material.tile_span;
    let tile_size = material.world_size.xz / vec2<f32>(span);
    let p = world_pos.xz + material.world_size.xz * 0.5;
    let cell = clamp(floor(p / tile_size), vec2<f32>(0.0), vec2<f32>(span - 1.0));
    let uv = p / tile_size - cell;
    return vec3<f32>(uv, cell.y * span + cell.x);
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let d = hex_distance(in.local_pos.xz);
    let f = smoothstep(d, material.outline_width, 0.0);

    let uv0 = in.world_pos.xz / material.world_size.xz + 0.5;
    let base = textureSample(base_map, map_sampler, uv0).rgb;

    let uv1 = atlas_uv(in.world_pos);
    let tiled = textureSample(atlas, map_sampler, uv1.xy, i32(uv1.z)).rgb;

    let texture_color = select(base, tiled, material.map_ready > 0.5) * in.color.rgb;
    let color = mix(material.outline_color, texture_color, f);
    return vec4<f32>(color, 1.0);
}
"#;

/// WGSL shader that draws a source texture over the whole target.
///
/// Used to copy a tile into one layer of the atlas; the sampler rescales
/// sources whose size differs from the layer.
pub const BLIT_SHADER: &str = r#"
@group(0) @binding(0)
var source: texture_2d<f32>;
@group(0) @binding(1)
var source_sampler: sampler;

struct BlitOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

// Fullscreen triangle from the vertex index
@vertex
fn vs_blit(@builtin(vertex_index) index: u32) -> BlitOutput {
    let x = f32((index << 1u) & 2u);
    let y = f32(index & 2u);
    var out: BlitOutput;
    out.clip_position = vec4<f32>(x * 2.0 - 1.0, 1.0 - y * 2.0, 0.0, 1.0);
    out.uv = vec2<f32>(x, y);
    return out;
}

@fragment
fn fs_blit(in: BlitOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(textureSample(source, source_sampler, in.uv).rgb, 1.0);
}
"#;
