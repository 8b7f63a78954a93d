//! Per-pixel effect evaluation for the software provider.

use gblur_core::{decode_srgb, DomainMode, IPoint, IRect};

use crate::kernel::{gaussian_kernel_1d, gaussian_kernel_2d};
use crate::paint::{Effect, Filter, Paint, TextureDomain};

/// Random access to the texels of a texture.
pub(crate) trait Texels: Sync {
    /// Texel at (x, y), clamped to the logical bounds.
    fn texel(&self, x: i32, y: i32) -> [f32; 4];
}

/// Texture read by a program, in linear light when `decode` is set.
pub(crate) struct Source<'a, T> {
    texture: &'a T,
    decode: bool,
}

impl<T: Texels> Texels for Source<'_, T> {
    #[inline]
    fn texel(&self, x: i32, y: i32) -> [f32; 4] {
        let px = self.texture.texel(x, y);
        if self.decode { decode_srgb(px) } else { px }
    }
}

/// An [`Effect`] with its kernel tables precomputed for one draw.
pub(crate) enum Program<'a, T> {
    Sample {
        texture: Source<'a, T>,
        filter: Filter,
        domain: Option<TextureDomain>,
    },
    Convolve1d {
        texture: Source<'a, T>,
        step: IPoint,
        radius: i32,
        kernel: Vec<f32>,
        mode: DomainMode,
        bounds: [i32; 2],
    },
    Convolve2d {
        texture: Source<'a, T>,
        radius_x: i32,
        radius_y: i32,
        kernel: Vec<f32>,
        mode: DomainMode,
        bounds: IRect,
    },
}

impl<'a, T: Texels> Program<'a, T> {
    pub(crate) fn compile(paint: &Paint<'a, T>) -> Self {
        let source = |texture: &'a T| Source { texture, decode: paint.gamma_correct };
        match paint.effect {
            Effect::Texture { texture, filter, domain } => Self::Sample {
                texture: source(texture),
                filter,
                domain,
            },
            Effect::GaussianConvolution { texture, direction, radius, sigma, mode, bounds } => {
                Self::Convolve1d {
                    texture: source(texture),
                    step: direction.step(),
                    radius,
                    kernel: gaussian_kernel_1d(radius, sigma),
                    mode,
                    bounds,
                }
            }
            Effect::MatrixConvolution { texture, radius_x, radius_y, sigma_x, sigma_y, mode, bounds } => {
                Self::Convolve2d {
                    texture: source(texture),
                    radius_x,
                    radius_y,
                    kernel: gaussian_kernel_2d(radius_x, radius_y, sigma_x, sigma_y),
                    mode,
                    bounds,
                }
            }
        }
    }

    /// Color for local point (u, v).
    pub(crate) fn shade(&self, u: f32, v: f32) -> [f32; 4] {
        match self {
            Self::Sample { texture, filter: Filter::Nearest, domain } => {
                fetch(texture, domain.as_ref(), u.floor() as i32, v.floor() as i32)
                    .unwrap_or([0.0; 4])
            }
            Self::Sample { texture, filter: Filter::Bilinear, domain } => {
                bilinear(texture, domain.as_ref(), u, v)
            }
            Self::Convolve1d { texture, step, radius, kernel, mode, bounds } => {
                let (cx, cy) = (u.floor() as i32, v.floor() as i32);
                let mut acc = [0.0f32; 4];
                for (k, w) in (-radius..=*radius).zip(kernel) {
                    let (x, y) = (cx + k * step.x, cy + k * step.y);
                    let resolved = if step.x != 0 {
                        mode.resolve(x, bounds[0], bounds[1]).map(|x| (x, y))
                    } else {
                        mode.resolve(y, bounds[0], bounds[1]).map(|y| (x, y))
                    };
                    if let Some((x, y)) = resolved {
                        madd(&mut acc, texture.texel(x, y), *w);
                    }
                }
                acc
            }
            Self::Convolve2d { texture, radius_x, radius_y, kernel, mode, bounds } => {
                let (cx, cy) = (u.floor() as i32, v.floor() as i32);
                let domain = TextureDomain::new(*bounds, *mode);
                let width = (2 * radius_x + 1) as usize;
                let mut acc = [0.0f32; 4];
                for (j, ky) in (-radius_y..=*radius_y).enumerate() {
                    for (i, kx) in (-radius_x..=*radius_x).enumerate() {
                        if let Some(px) = fetch(texture, Some(&domain), cx + kx, cy + ky) {
                            madd(&mut acc, px, kernel[j * width + i]);
                        }
                    }
                }
                acc
            }
        }
    }
}

#[inline]
fn fetch<T: Texels>(texture: &T, domain: Option<&TextureDomain>, x: i32, y: i32) -> Option<[f32; 4]> {
    let (x, y) = match domain {
        Some(d) => d.resolve(x, y)?,
        None => (x, y),
    };
    Some(texture.texel(x, y))
}

fn bilinear<T: Texels>(texture: &T, domain: Option<&TextureDomain>, u: f32, v: f32) -> [f32; 4] {
    let (u, v) = (u - 0.5, v - 0.5);
    let (x0, y0) = (u.floor(), v.floor());
    let (fx, fy) = (u - x0, v - y0);
    let (x0, y0) = (x0 as i32, y0 as i32);

    let taps = [
        (x0, y0, (1.0 - fx) * (1.0 - fy)),
        (x0 + 1, y0, fx * (1.0 - fy)),
        (x0, y0 + 1, (1.0 - fx) * fy),
        (x0 + 1, y0 + 1, fx * fy),
    ];
    let mut acc = [0.0f32; 4];
    for (x, y, w) in taps {
        // Zero-weight taps may sit outside anything ever written.
        if w == 0.0 {
            continue;
        }
        if let Some(px) = fetch(texture, domain, x, y) {
            madd(&mut acc, px, w);
        }
    }
    acc
}

#[inline]
fn madd(acc: &mut [f32; 4], px: [f32; 4], w: f32) {
    for c in 0..4 {
        acc[c] += px[c] * w;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::Direction;
    use approx::assert_relative_eq;

    /// 4x1 ramp: texel x has value x in every channel.
    struct Ramp;

    impl Texels for Ramp {
        fn texel(&self, x: i32, _y: i32) -> [f32; 4] {
            [x.clamp(0, 3) as f32; 4]
        }
    }

    #[test]
    fn test_nearest_floor() {
        let p = Program::compile(&Paint::texture(&Ramp));
        assert_eq!(p.shade(2.5, 0.5)[0], 2.0);
        assert_eq!(p.shade(2.99, 0.5)[0], 2.0);
    }

    #[test]
    fn test_bilinear_midpoint() {
        let p = Program::compile(&Paint::bilinear(&Ramp, None));
        // Halfway between texel 1 and texel 2
        assert_relative_eq!(p.shade(2.0, 0.5)[0], 1.5);
    }

    #[test]
    fn test_bilinear_decal_domain() {
        let domain = TextureDomain::new(IRect::from_ltrb(0, 0, 2, 1), DomainMode::Decal);
        let p = Program::compile(&Paint::bilinear(&Ramp, Some(domain)));
        // Texel 2 is outside the domain and contributes nothing
        assert_relative_eq!(p.shade(2.0, 0.5)[0], 0.5);
    }

    #[test]
    fn test_convolution_clamped_bounds() {
        let p = Program::compile(&Paint::new(Effect::GaussianConvolution {
            texture: &Ramp,
            direction: Direction::X,
            radius: 2,
            sigma: 0.7,
            mode: DomainMode::Clamp,
            bounds: [1, 2],
        }));
        // Every tap is clamped to texel 1
        assert_relative_eq!(p.shade(3.5, 0.5)[0], 1.0, epsilon = 1e-6);
    }

    /// Alternating black and white columns.
    struct Stripes;

    impl Texels for Stripes {
        fn texel(&self, x: i32, _y: i32) -> [f32; 4] {
            let v = (x & 1) as f32;
            [v, v, v, 1.0]
        }
    }

    #[test]
    fn test_gamma_correct_filters_linear_light() {
        let stored = Program::compile(&Paint::bilinear(&Stripes, None));
        assert_relative_eq!(stored.shade(1.0, 0.5)[0], 0.5);

        let linear = Program::compile(&Paint::bilinear(&Stripes, None).with_gamma_correct(true));
        // Endpoints decode to themselves; the midpoint is encoded by the writer
        assert_relative_eq!(linear.shade(1.0, 0.5)[0], 0.5);
        assert_relative_eq!(linear.shade(1.0, 0.5)[3], 1.0);

        struct Gray;
        impl Texels for Gray {
            fn texel(&self, _x: i32, _y: i32) -> [f32; 4] {
                [0.5, 0.5, 0.5, 0.5]
            }
        }
        let gray = Program::compile(&Paint::texture(&Gray).with_gamma_correct(true));
        let px = gray.shade(0.5, 0.5);
        assert_relative_eq!(px[0], 0.21404114, epsilon = 1e-6);
        assert_relative_eq!(px[3], 0.5);
    }
}
