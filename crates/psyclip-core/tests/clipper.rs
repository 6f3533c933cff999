//! Integration tests for the psychoacoustic clipper.
//!
//! Drives whole streams through [`Clipper`] and checks signal-level behaviour:
//! peak control, pass-through below the ceiling, latency alignment,
//! `diff_only` consistency, determinism, and backend independence through a
//! reference DFT implementing [`RealFft`].

use psyclip_core::{
    Clipper, DEFAULT_ITERATIONS, HannWindow, INV_WINDOW_FLOOR, MarginPoint, PsyClipper, RealFft,
    peak_abs,
};

const SAMPLE_RATE: u32 = 44_100;
const TAU: f32 = core::f32::consts::TAU;

fn generate_sine(freq_hz: f32, amplitude: f32, num_samples: usize) -> Vec<f32> {
    (0..num_samples)
        .map(|n| amplitude * libm::sinf(TAU * freq_hz * n as f32 / SAMPLE_RATE as f32))
        .collect()
}

/// Feed `input` hop by hop, returning the output stream.
fn run<F: RealFft>(clipper: &mut PsyClipper<F>, input: &[f32], diff_only: bool) -> Vec<f32> {
    let hop = clipper.feed_size();
    let mut output = vec![0.0; input.len()];
    for (inp, out) in input.chunks_exact(hop).zip(output.chunks_exact_mut(hop)) {
        clipper.feed(inp, out, diff_only, None);
    }
    output
}

/// O(N²) DFT in the packed real layout, as an independent backend.
struct ReferenceDft {
    size: usize,
}

impl RealFft for ReferenceDft {
    fn size(&self) -> usize {
        self.size
    }

    fn forward(&mut self, input: &[f32], spectrum: &mut [f32]) {
        let n = self.size;
        let half = n / 2;
        for k in 0..=half {
            let (mut re, mut im) = (0.0_f64, 0.0_f64);
            for (t, &x) in input.iter().enumerate() {
                let phase = -2.0 * core::f64::consts::PI * (k * t) as f64 / n as f64;
                re += f64::from(x) * phase.cos();
                im += f64::from(x) * phase.sin();
            }
            if k == 0 {
                spectrum[0] = re as f32;
            } else if k == half {
                spectrum[1] = re as f32;
            } else {
                spectrum[2 * k] = re as f32;
                spectrum[2 * k + 1] = im as f32;
            }
        }
    }

    fn inverse(&mut self, spectrum: &[f32], output: &mut [f32]) {
        let n = self.size;
        let half = n / 2;
        for (t, out) in output.iter_mut().enumerate() {
            let mut acc = f64::from(spectrum[0]);
            acc += f64::from(spectrum[1]) * if t % 2 == 0 { 1.0 } else { -1.0 };
            for k in 1..half {
                let phase = 2.0 * core::f64::consts::PI * (k * t) as f64 / n as f64;
                let re = f64::from(spectrum[2 * k]);
                let im = f64::from(spectrum[2 * k + 1]);
                acc += 2.0 * (re * phase.cos() - im * phase.sin());
            }
            *out = acc as f32;
        }
    }
}

// ============================================================================
// Window
// ============================================================================

#[test]
fn window_inverse_identity_above_floor() {
    let window = HannWindow::new(2048);
    for (&w, &inv) in window.coefficients().iter().zip(window.inverse()) {
        if w > INV_WINDOW_FLOOR {
            assert!((w * inv - 1.0).abs() < 1e-5);
        } else {
            assert_eq!(inv, 0.0);
        }
    }
}

// ============================================================================
// Pass-through
// ============================================================================

#[test]
fn below_ceiling_is_exact_delay() {
    let mut clipper = Clipper::new(SAMPLE_RATE, 2048, 1.0).unwrap();
    let a = generate_sine(220.0, 0.4, 2048 * 6);
    let b = generate_sine(3_300.0, 0.3, 2048 * 6);
    let input: Vec<f32> = a.iter().zip(&b).map(|(x, y)| x + y).collect();
    assert!(peak_abs(&input) < 1.0);

    let output = run(&mut clipper, &input, false);
    let latency = clipper.latency_samples();
    assert_eq!(latency, 2048 - 512);
    for i in latency..input.len() {
        assert_eq!(output[i], input[i - latency], "sample {i}");
    }
    assert!(clipper.clipping_delta().iter().all(|&d| d == 0.0));
}

#[test]
fn impulse_arrives_after_latency() {
    let mut clipper = Clipper::new(SAMPLE_RATE, 1024, 1.0).unwrap();
    let mut input = vec![0.0_f32; 1024 * 4];
    input[100] = 0.5;
    let output = run(&mut clipper, &input, false);
    let latency = clipper.latency_samples();
    let arrival = output.iter().position(|&x| x != 0.0).unwrap();
    assert_eq!(arrival, 100 + latency);
    assert_eq!(output[arrival], 0.5);
}

// ============================================================================
// Peak control
// ============================================================================

#[test]
fn sine_at_twice_ceiling_converges() {
    // 1 kHz at amplitude 2.0, 2048-point frames, default iterations
    let mut clipper = Clipper::new(SAMPLE_RATE, 2048, 1.0).unwrap();
    assert_eq!(clipper.iterations(), DEFAULT_ITERATIONS);
    let input = generate_sine(1_000.0, 2.0, 2048 * 24);
    let output = run(&mut clipper, &input, false);

    let settled = &output[2048 * 6..];
    let peak = peak_abs(settled);
    assert!(peak <= 1.05, "steady-state peak {peak}");
    assert!(peak > 0.9, "steady-state peak {peak}");

    // Every hop is held, not just the loudest one on average
    for (i, hop) in settled.chunks_exact(512).enumerate() {
        assert!(peak_abs(hop) <= 1.05, "hop {i} peak {}", peak_abs(hop));
    }
}

#[test]
fn more_iterations_do_not_hurt_peak_control() {
    let input = generate_sine(1_000.0, 2.0, 2048 * 16);

    let mut few = Clipper::new(SAMPLE_RATE, 2048, 1.0).unwrap();
    few.set_iterations(2);
    let mut many = Clipper::new(SAMPLE_RATE, 2048, 1.0).unwrap();
    many.set_iterations(12);

    let peak_few = peak_abs(&run(&mut few, &input, false)[2048 * 6..]);
    let peak_many = peak_abs(&run(&mut many, &input, false)[2048 * 6..]);
    assert!(peak_many <= peak_few + 0.05, "{peak_many} vs {peak_few}");
}

#[test]
fn lower_clip_level_scales_ceiling() {
    // Same 2x overdrive as above, against a 0.5 ceiling
    let mut clipper = Clipper::new(SAMPLE_RATE, 2048, 0.5).unwrap();
    let input = generate_sine(1_000.0, 1.0, 2048 * 24);
    let output = run(&mut clipper, &input, false);
    let peak = peak_abs(&output[2048 * 6..]);
    assert!(peak <= 1.05 * 0.5, "peak {peak}");
    assert!(peak > 0.45, "peak {peak}");
}

// ============================================================================
// diff_only and determinism
// ============================================================================

#[test]
fn diff_only_is_full_minus_delayed_input() {
    let input = generate_sine(700.0, 1.8, 2048 * 8);
    let mut full = Clipper::new(SAMPLE_RATE, 2048, 1.0).unwrap();
    let mut diff = full.clone();

    let wet = run(&mut full, &input, false);
    let dist = run(&mut diff, &input, true);
    let latency = full.latency_samples();

    for i in latency..input.len() {
        let expected = wet[i] - dist[i];
        assert!(
            (expected - input[i - latency]).abs() < 1e-5,
            "sample {i}: {expected} vs {}",
            input[i - latency]
        );
    }
    assert!(dist.iter().any(|&d| d != 0.0));
}

#[test]
fn identical_state_gives_identical_output() {
    let input = generate_sine(440.0, 3.0, 1024 * 8);
    let mut a = Clipper::new(SAMPLE_RATE, 1024, 1.0).unwrap();
    let _ = run(&mut a, &input[..1024 * 2], false);
    let mut b = a.clone();

    let out_a = run(&mut a, &input[1024 * 2..], false);
    let out_b = run(&mut b, &input[1024 * 2..], false);
    assert!(
        out_a
            .iter()
            .zip(&out_b)
            .all(|(x, y)| x.to_bits() == y.to_bits())
    );
}

// ============================================================================
// Margin shift metering
// ============================================================================

#[test]
fn quiet_input_reports_baseline_shift() {
    let mut clipper = Clipper::new(SAMPLE_RATE, 512, 1.0).unwrap();
    let hop = clipper.feed_size();
    let input = generate_sine(440.0, 0.25, hop);
    let mut output = vec![0.0; hop];
    let mut total = 1.0_f32;
    clipper.feed(&input, &mut output, false, Some(&mut total));

    let baseline = 1.122_f32.powi(DEFAULT_ITERATIONS as i32 - 1);
    assert!((total - baseline).abs() < 1e-4, "{total} vs {baseline}");
}

#[test]
fn zero_strength_freezes_mask() {
    let mut clipper = Clipper::new(SAMPLE_RATE, 512, 1.0).unwrap();
    clipper.set_adaptive_distortion_strength(0.0);
    let hop = clipper.feed_size();
    let input = generate_sine(1_000.0, 4.0, hop * 8);
    let mut output = vec![0.0; hop];
    for chunk in input.chunks_exact(hop) {
        let mut total = 1.0_f32;
        clipper.feed(chunk, &mut output, false, Some(&mut total));
        assert_eq!(total, 1.0);
    }
}

#[test]
fn single_iteration_reports_no_shift() {
    let mut clipper = Clipper::new(SAMPLE_RATE, 512, 1.0).unwrap();
    clipper.set_iterations(1);
    let hop = clipper.feed_size();
    let input = generate_sine(1_000.0, 4.0, hop);
    let mut output = vec![0.0; hop];
    let mut total = 1.0_f32;
    clipper.feed(&input, &mut output, false, Some(&mut total));
    assert_eq!(total, 1.0);
}

#[test]
fn heavier_margin_limits_distortion() {
    let input = generate_sine(1_000.0, 2.0, 1024 * 12);

    let mut loose = Clipper::new(SAMPLE_RATE, 1024, 1.0).unwrap();
    loose.set_adaptive_distortion_strength(0.0);
    loose.set_margin_curve(&[MarginPoint::new(0, 0)]).unwrap();

    let mut strict = Clipper::new(SAMPLE_RATE, 1024, 1.0).unwrap();
    strict.set_adaptive_distortion_strength(0.0);
    strict.set_margin_curve(&[MarginPoint::new(0, 40)]).unwrap();

    let energy = |d: &[f32]| d.iter().map(|x| x * x).sum::<f32>();
    let loose_dist = energy(&run(&mut loose, &input, true)[1024 * 4..]);
    let strict_dist = energy(&run(&mut strict, &input, true)[1024 * 4..]);
    assert!(strict_dist < loose_dist, "{strict_dist} vs {loose_dist}");
}

// ============================================================================
// Backend independence
// ============================================================================

#[test]
fn reference_backend_matches_rustfft() {
    let size = 64;
    let input = generate_sine(2_000.0, 1.7, size * 8);

    let mut fast = Clipper::new(SAMPLE_RATE, size, 1.0).unwrap();
    let mut reference =
        PsyClipper::with_transform(SAMPLE_RATE, size, 1.0, ReferenceDft { size }).unwrap();

    let out_fast = run(&mut fast, &input, false);
    let out_ref = run(&mut reference, &input, false);
    for (i, (a, b)) in out_fast.iter().zip(&out_ref).enumerate() {
        assert!((a - b).abs() < 1e-3, "sample {i}: {a} vs {b}");
    }
}
