//! WGSL shader sources for the wgpu provider.
//!
//! Surfaces are `array<vec4<f32>>` buffers laid out row-major with the
//! backing width as stride. Writes are rounded to the surface format in the
//! shader so results match the software provider.

/// Fills a rectangle with a (pre-quantized) color.
pub const CLEAR: &str = r#"
struct ClearParams {
    rect: vec4<i32>,   // l, t, r, b
    dims: vec4<u32>,   // stride, 0, 0, 0
    color: vec4<f32>,
}

@group(0) @binding(0) var<storage, read_write> dst: array<vec4<f32>>;
@group(0) @binding(1) var<uniform> p: ClearParams;

@compute @workgroup_size(16, 16)
fn main(@builtin(global_invocation_id) id: vec3<u32>) {
    let x = p.rect.x + i32(id.x);
    let y = p.rect.y + i32(id.y);
    if x >= p.rect.z || y >= p.rect.w { return; }
    dst[u32(y) * p.dims.x + u32(x)] = p.color;
}
"#;

/// Rectangle draw: texture sampling, 1D Gaussian or 2D Gaussian.
pub const DRAW: &str = r#"
struct DrawParams {
    rect: vec4<i32>,      // clipped destination l, t, r, b
    dst_dims: vec4<u32>,  // stride, format, gamma correct, 0
    src_dims: vec4<u32>,  // width, height, stride, 0
    local: vec4<f32>,     // sx, sy, tx, ty
    domain: vec4<i32>,    // l, t, r, b
    modes: vec4<u32>,     // effect, domain mode x, domain mode y, 0
    radius: vec4<i32>,    // radius x, radius y, axis, 0
}

@group(0) @binding(0) var<storage, read> src: array<vec4<f32>>;
@group(0) @binding(1) var<storage, read_write> dst: array<vec4<f32>>;
@group(0) @binding(2) var<uniform> p: DrawParams;
@group(0) @binding(3) var<storage, read> weights: array<f32>;

// Returns (index, valid). Modes: 0 ignore, 1 clamp, 2 repeat, 3 decal.
fn resolve(i: i32, lo: i32, hi: i32, mode: u32) -> vec2<i32> {
    if mode == 0u { return vec2<i32>(i, 1); }
    if hi <= lo { return vec2<i32>(i, 0); }
    if mode == 1u { return vec2<i32>(clamp(i, lo, hi - 1), 1); }
    if mode == 2u {
        let n = hi - lo;
        return vec2<i32>(lo + ((i - lo) % n + n) % n, 1);
    }
    if i < lo || i >= hi { return vec2<i32>(i, 0); }
    return vec2<i32>(i, 1);
}

fn srgb_to_linear(c: vec4<f32>) -> vec4<f32> {
    let v = max(c.rgb, vec3<f32>(0.0));
    let lo = v / 12.92;
    let hi = pow((v + 0.055) / 1.055, vec3<f32>(2.4));
    return vec4<f32>(select(hi, lo, v <= vec3<f32>(0.04045)), c.a);
}

fn linear_to_srgb(c: vec4<f32>) -> vec4<f32> {
    let v = max(c.rgb, vec3<f32>(0.0));
    let lo = v * 12.92;
    let hi = 1.055 * pow(v, vec3<f32>(1.0 / 2.4)) - 0.055;
    return vec4<f32>(select(hi, lo, v <= vec3<f32>(0.0031308)), c.a);
}

fn texel(x: i32, y: i32) -> vec4<f32> {
    let cx = clamp(x, 0, i32(p.src_dims.x) - 1);
    let cy = clamp(y, 0, i32(p.src_dims.y) - 1);
    let t = src[u32(cy) * p.src_dims.z + u32(cx)];
    if p.dst_dims.z == 1u { return srgb_to_linear(t); }
    return t;
}

fn fetch(x: i32, y: i32) -> vec4<f32> {
    let rx = resolve(x, p.domain.x, p.domain.z, p.modes.y);
    let ry = resolve(y, p.domain.y, p.domain.w, p.modes.z);
    if rx.y == 0 || ry.y == 0 { return vec4<f32>(0.0); }
    return texel(rx.x, ry.x);
}

fn bilinear(uv: vec2<f32>) -> vec4<f32> {
    let st = uv - vec2<f32>(0.5);
    let base = floor(st);
    let f = st - base;
    let x0 = i32(base.x);
    let y0 = i32(base.y);
    let w00 = (1.0 - f.x) * (1.0 - f.y);
    let w10 = f.x * (1.0 - f.y);
    let w01 = (1.0 - f.x) * f.y;
    let w11 = f.x * f.y;
    var acc = vec4<f32>(0.0);
    if w00 > 0.0 { acc += w00 * fetch(x0, y0); }
    if w10 > 0.0 { acc += w10 * fetch(x0 + 1, y0); }
    if w01 > 0.0 { acc += w01 * fetch(x0, y0 + 1); }
    if w11 > 0.0 { acc += w11 * fetch(x0 + 1, y0 + 1); }
    return acc;
}

fn convolve_1d(cx: i32, cy: i32) -> vec4<f32> {
    let r = p.radius.x;
    var step = vec2<i32>(1, 0);
    if p.radius.z == 1 { step = vec2<i32>(0, 1); }
    var acc = vec4<f32>(0.0);
    for (var k = -r; k <= r; k += 1) {
        acc += weights[u32(k + r)] * fetch(cx + k * step.x, cy + k * step.y);
    }
    return acc;
}

fn convolve_2d(cx: i32, cy: i32) -> vec4<f32> {
    let rx = p.radius.x;
    let ry = p.radius.y;
    let width = 2 * rx + 1;
    var acc = vec4<f32>(0.0);
    for (var ky = -ry; ky <= ry; ky += 1) {
        for (var kx = -rx; kx <= rx; kx += 1) {
            let w = weights[u32((ky + ry) * width + kx + rx)];
            acc += w * fetch(cx + kx, cy + ky);
        }
    }
    return acc;
}

fn unorm(c: vec4<f32>, m: vec4<f32>) -> vec4<f32> {
    return floor(clamp(c, vec4<f32>(0.0), vec4<f32>(1.0)) * m + vec4<f32>(0.5)) / m;
}

// Format codes match `format_code` in the wgpu provider.
fn quantize(c: vec4<f32>, format: u32) -> vec4<f32> {
    switch format {
        case 0u: { return unorm(c, vec4<f32>(255.0)); }
        case 1u: { return vec4<f32>(unorm(c, vec4<f32>(255.0)).xyz, 1.0); }
        case 2u: { return unorm(c, vec4<f32>(15.0)); }
        case 3u: { return vec4<f32>(unorm(c, vec4<f32>(31.0, 63.0, 31.0, 1.0)).xyz, 1.0); }
        case 4u: { return unorm(c, vec4<f32>(1023.0, 1023.0, 1023.0, 3.0)); }
        case 5u: { return vec4<f32>(0.0, 0.0, 0.0, unorm(c, vec4<f32>(255.0)).w); }
        case 6u: {
            let rg = unpack2x16float(pack2x16float(c.xy));
            let ba = unpack2x16float(pack2x16float(c.zw));
            return vec4<f32>(rg, ba);
        }
        case 7u: { return vec4<f32>(unorm(c, vec4<f32>(255.0)).xy, 0.0, 1.0); }
        case 8u: { return vec4<f32>(unpack2x16float(pack2x16float(c.xx)).x, 0.0, 0.0, 1.0); }
        default: { return c; }
    }
}

@compute @workgroup_size(16, 16)
fn main(@builtin(global_invocation_id) id: vec3<u32>) {
    let x = p.rect.x + i32(id.x);
    let y = p.rect.y + i32(id.y);
    if x >= p.rect.z || y >= p.rect.w { return; }

    let uv = vec2<f32>(f32(x) + 0.5, f32(y) + 0.5) * p.local.xy + p.local.zw;
    let cx = i32(floor(uv.x));
    let cy = i32(floor(uv.y));

    var c: vec4<f32>;
    switch p.modes.x {
        case 0u: { c = fetch(cx, cy); }
        case 1u: { c = bilinear(uv); }
        case 2u: { c = convolve_1d(cx, cy); }
        default: { c = convolve_2d(cx, cy); }
    }

    let idx = u32(y) * p.dst_dims.x + u32(x);
    if p.dst_dims.z == 1u {
        c = linear_to_srgb(c);
    }
    dst[idx] = quantize(c, p.dst_dims.y);
}
"#;
