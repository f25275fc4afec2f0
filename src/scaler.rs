//! Nearest-neighbour upscale of the internal framebuffer into the window.

use rayon::{
    iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

/// Precomputed source column/row for every destination pixel
pub struct ScaleLut {
    dst_w: usize,
    src_x: Vec<usize>,
    src_row: Vec<usize>, // offset of the source row start
}

impl ScaleLut {
    pub fn empty() -> Self {
        Self {
            dst_w: 0,
            src_x: Vec::new(),
            src_row: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.src_x.is_empty() || self.src_row.is_empty()
    }

    /// Whether the table was built for a destination of this size.
    pub fn fits(&self, dst_w: usize, dst_h: usize) -> bool {
        self.dst_w == dst_w && self.src_row.len() == dst_h
    }
}

/// Nearest-neighbour mapping from a `dst_w` x `dst_h` target onto a
/// `src_w` x `src_h` framebuffer. Sample at pixel centres so the stretch stays
/// symmetric.
pub fn build_scale_lut(dst_w: usize, dst_h: usize, src_w: usize, src_h: usize) -> ScaleLut {
    if dst_w == 0 || dst_h == 0 || src_w == 0 || src_h == 0 {
        return ScaleLut::empty();
    }

    let sx = src_w as f32 / dst_w as f32;
    let sy = src_h as f32 / dst_h as f32;

    let src_x = (0..dst_w)
        .map(|x| (((x as f32 + 0.5) * sx) as usize).min(src_w - 1))
        .collect();
    let src_row = (0..dst_h)
        .map(|y| (((y as f32 + 0.5) * sy) as usize).min(src_h - 1) * src_w)
        .collect();

    ScaleLut {
        dst_w,
        src_x,
        src_row,
    }
}

/// Parallel nearest-neighbour stretch
/// Rows are processed in parallel for cache friendly writes
pub fn blit_nearest_stretch(dst: &mut [u32], src: &[u32], lut: &ScaleLut) {
    if lut.is_empty() {
        return;
    }
    dst.par_chunks_mut(lut.dst_w)
        .zip(lut.src_row.par_iter())
        .for_each(|(dst_row, &row)| {
            for (d, &x) in dst_row.iter_mut().zip(&lut.src_x) {
                *d = src[row + x];
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let src: Vec<u32> = (0..6).collect();
        let lut = build_scale_lut(3, 2, 3, 2);
        let mut dst = vec![0; 6];
        blit_nearest_stretch(&mut dst, &src, &lut);
        assert_eq!(dst, src);
    }

    #[test]
    fn test_upscale_by_two() {
        let src = vec![1, 2, 3, 4];
        let lut = build_scale_lut(4, 4, 2, 2);
        assert!(lut.fits(4, 4));
        let mut dst = vec![0; 16];
        blit_nearest_stretch(&mut dst, &src, &lut);
        assert_eq!(
            dst,
            vec![1, 1, 2, 2, 1, 1, 2, 2, 3, 3, 4, 4, 3, 3, 4, 4]
        );
    }

    #[test]
    fn test_empty_target() {
        let lut = build_scale_lut(0, 10, 4, 4);
        assert!(lut.is_empty());
        let mut dst: Vec<u32> = Vec::new();
        blit_nearest_stretch(&mut dst, &[1, 2, 3], &lut);
    }
}
