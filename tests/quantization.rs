use trajc::core::quantize::{dequantize, key_frame_bit_width, quantize, unzigzag, zigzag};

#[test]
fn zigzag_is_a_bijection_over_a_wide_sample() {
    for v in (-5000..5000).step_by(37) {
        assert_eq!(unzigzag(zigzag(v)), v);
    }
}

#[test]
fn quantize_dequantize_never_drifts_when_reapplied() {
    let quantum = 0.0025;
    for raw in [-123.456, -1.0, 0.0, 0.3333333, 42.0, 9999.125] {
        let q = quantize(raw, quantum);
        let reconstructed = dequantize(q, quantum);
        // requantizing the reconstruction must land on the same integer:
        // this is the anchor property the predictor's flush() relies on to
        // avoid drift across segments.
        assert_eq!(quantize(reconstructed, quantum), q);
    }
}

#[test]
fn key_frame_bit_width_grows_with_bound_and_shrinks_with_quantum() {
    let narrow = key_frame_bit_width(1.0, 0.1);
    let wide = key_frame_bit_width(1000.0, 0.1);
    assert!(wide > narrow);

    let coarse = key_frame_bit_width(10.0, 1.0);
    let fine = key_frame_bit_width(10.0, 0.001);
    assert!(fine > coarse);
}
