//! Spectral Analysis - radix-2 FFT
//!
//! In-crate iterative FFT, deterministic by construction: no planner
//! state, no scratch reuse, same input bits always produce the same
//! output bits on a given build.
//!
//! Sequences are zero-padded to the next power of two; magnitudes are
//! reported for the non-redundant bins, DC through Nyquist inclusive.

/// Magnitude spectrum of the sequence.
///
/// Returns `len/2 + 1` magnitudes over the zero-padded length: DC
/// through Nyquist inclusive. The input is real, so the remaining bins
/// are redundant and dropped.
pub fn magnitude_spectrum(signal: &[f32]) -> Vec<f32> {
    let padded_len = signal.len().next_power_of_two().max(2);

    // Complex buffer in f64 to keep butterfly error away from f32 features.
    let mut re: Vec<f64> = signal.iter().map(|&v| v as f64).collect();
    re.resize(padded_len, 0.0);
    let mut im = vec![0.0f64; padded_len];

    fft_in_place(&mut re, &mut im);

    (0..=padded_len / 2)
        .map(|k| (re[k] * re[k] + im[k] * im[k]).sqrt() as f32)
        .collect()
}

/// Iterative radix-2 Cooley-Tukey. Length must be a power of two.
fn fft_in_place(re: &mut [f64], im: &mut [f64]) {
    let n = re.len();
    debug_assert!(n.is_power_of_two());

    // Bit-reversal permutation
    let bits = n.trailing_zeros();
    for i in 0..n {
        let j = (i.reverse_bits() >> (usize::BITS - bits)) as usize;
        if j > i {
            re.swap(i, j);
            im.swap(i, j);
        }
    }

    // Butterfly passes
    let mut len = 2;
    while len <= n {
        let angle_step = -2.0 * std::f64::consts::PI / len as f64;
        let half = len / 2;

        let mut start = 0;
        while start < n {
            for k in 0..half {
                let angle = angle_step * k as f64;
                let (w_im, w_re) = angle.sin_cos();

                let a = start + k;
                let b = a + half;

                let t_re = re[b] * w_re - im[b] * w_im;
                let t_im = re[b] * w_im + im[b] * w_re;

                re[b] = re[a] - t_re;
                im[b] = im[a] - t_im;
                re[a] += t_re;
                im[a] += t_im;
            }
            start += len;
        }
        len <<= 1;
    }
}
