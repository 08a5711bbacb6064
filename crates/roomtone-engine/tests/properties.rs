//! Property-based tests for coefficient cooking and the engine.
//!
//! Uses proptest to check that normalization stays in range, that cooking
//! only the groups a control feeds gives the same result as a full cook, and
//! that random parameter sets render finite output.

use proptest::prelude::*;
use roomtone_engine::{
    ChannelConfig, ControlId, CookedCoefficients, FrameProcessor, ReverbEngine, ReverbParams,
};

const SR: f32 = 48000.0;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// Normalization is finite and in [0, 1] across density, diffusion and
    /// decay time.
    #[test]
    fn normalization_in_unit_range(
        density in 0.0f32..=100.0f32,
        diffusion in 0.0f32..=100.0f32,
        decay in 0.1f32..=20.0f32,
    ) {
        let mut params = ReverbParams::default();
        params.set(ControlId::Density, density);
        params.set(ControlId::Diffusion, diffusion);
        params.set(ControlId::DecayTime, decay);

        let cooked = CookedCoefficients::cook(&params, SR);
        for ch in 0..2 {
            let norm = cooked.norm[ch];
            prop_assert!(
                norm.is_finite() && (0.0..=1.0).contains(&norm),
                "density {} diffusion {} decay {}: norm {}", density, diffusion, decay, norm
            );
            prop_assert!(cooked.late_level[ch].is_finite());
        }
    }

    /// Recooking the dependency groups of each change in turn gives the same
    /// coefficients as cooking the final parameter set from scratch.
    #[test]
    fn incremental_cook_matches_full_cook(
        changes in prop::collection::vec((0usize..14, 0.0f32..=1.0f32), 1..12),
    ) {
        let mut params = ReverbParams::default();
        let mut cooked = CookedCoefficients::cook(&params, SR);

        for (index, t) in changes {
            let control = ControlId::ALL[index];
            params.set(control, control.descriptor().denormalize(t));
            cooked.recook(&params, control.dependencies());
        }

        prop_assert_eq!(cooked, CookedCoefficients::cook(&params, SR));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Any parameter set renders finite output from a mono impulse.
    #[test]
    fn random_params_render_finite_output(
        values in prop::array::uniform16(0.0f32..=1.0f32),
    ) {
        let mut engine = ReverbEngine::default();
        for (i, control) in ControlId::ALL.iter().enumerate() {
            engine.on_parameter_changed_normalized(control.id(), values[i]).unwrap();
        }
        engine.reset(SR).unwrap();

        let mut out = [0.0; 2];
        for n in 0..4800 {
            let x = if n == 0 { 1.0 } else { 0.0 };
            engine.process_frame(ChannelConfig::MONO_TO_STEREO, &[x], &mut out).unwrap();
            prop_assert!(out[0].is_finite() && out[1].is_finite(), "frame {}: {:?}", n, out);
        }
    }
}
