//! Built-in resonance lineshapes.
//!
//! Every builder turns a typed parameter set into a pure function of the
//! subsystem's invariant mass squared. All breakup momenta and barrier
//! factors go through the single Källén definition in `amp_core::kin`, so
//! threshold behaviour is identical across builders. Parameter validation
//! happens once at build time; the returned closures are infallible.

use std::sync::Arc;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use amp_core::errors::{AmpError, ErrorInfo};
use amp_core::kin::breakup_momentum_sq;

use crate::registry::{BuildContext, LineshapeBuilder, LineshapeFn};

fn lineshape_error(info: ErrorInfo) -> AmpError {
    AmpError::Lineshape(info)
}

/// Squared Blatt-Weisskopf barrier factor for orbital momentum `l`, with
/// `z = (q * d)^2`.
pub fn blatt_weisskopf_sq(l: u32, z: f64) -> Result<f64, AmpError> {
    match l {
        0 => Ok(1.0),
        1 => Ok(2.0 * z / (z + 1.0)),
        2 => Ok(13.0 * z * z / ((z - 3.0).powi(2) + 9.0 * z)),
        3 => {
            let denominator = z * (z - 15.0).powi(2) + 9.0 * (2.0 * z - 5.0).powi(2);
            Ok(277.0 * z.powi(3) / denominator)
        }
        other => Err(lineshape_error(
            ErrorInfo::new(
                "barrier-order",
                "Blatt-Weisskopf barrier factors are tabulated up to l = 3",
            )
            .with_context("l", other.to_string()),
        )),
    }
}

/// Parameters of the single-channel relativistic Breit-Wigner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreitWignerDef {
    /// Pole mass in GeV/c^2.
    pub mass: f64,
    /// Width at the pole mass.
    pub width: f64,
    /// Masses of the two decay products.
    pub ma: f64,
    pub mb: f64,
    /// Orbital angular momentum of the decay.
    pub l: u32,
    /// Barrier radius in GeV^-1.
    pub d: f64,
}

/// One channel of a multichannel Breit-Wigner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelDef {
    /// Squared coupling of the resonance to the channel.
    pub gsq: f64,
    /// Channel threshold masses.
    pub ma: f64,
    pub mb: f64,
    /// Orbital angular momentum in the channel.
    pub l: u32,
    /// Barrier radius in GeV^-1.
    pub d: f64,
}

/// Parameters of the Flatte-style multichannel Breit-Wigner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultichannelBreitWignerDef {
    /// Pole mass in GeV/c^2.
    pub mass: f64,
    /// Coupled channels; the running width is the sum of their widths.
    pub channels: Vec<ChannelDef>,
}

/// Builder for the single-channel relativistic Breit-Wigner.
///
/// Width runs as `(q/q0)^(2l+1) * (m0/sqrt(s)) * B'_l(q)/B'_l(q0)`, and the
/// numerator carries the decay barrier `(q/q0)^l * B'_l(q)/B'_l(q0)`, so for
/// `l >= 1` the amplitude vanishes exactly at the channel threshold.
#[derive(Debug, Clone, Copy, Default)]
pub struct BreitWigner;

impl LineshapeBuilder for BreitWigner {
    fn build(&self, ctx: &BuildContext<'_>) -> Result<LineshapeFn, AmpError> {
        let def: BreitWignerDef = ctx.decode()?;
        let q0_sq = breakup_momentum_sq(def.mass * def.mass, def.ma, def.mb);
        if q0_sq <= 0.0 {
            return Err(lineshape_error(
                ErrorInfo::new(
                    "pole-below-threshold",
                    "Breit-Wigner pole mass sits at or below the channel threshold",
                )
                .with_context("function", ctx.function_name.to_string())
                .with_context("mass", def.mass.to_string()),
            ));
        }
        let barrier_at_pole = blatt_weisskopf_sq(def.l, q0_sq * def.d * def.d)?;
        let BreitWignerDef {
            mass,
            width,
            ma,
            mb,
            l,
            d,
        } = def;
        Ok(Arc::new(move |s: f64| {
            let q_sq = breakup_momentum_sq(s, ma, mb);
            // At and below the channel threshold the width shuts off and the
            // barrier numerator survives only for s-wave.
            if s <= 0.0 || q_sq <= 0.0 {
                let numerator = if l == 0 { 1.0 } else { 0.0 };
                return Complex64::new(numerator, 0.0) / Complex64::new(mass * mass - s, 0.0);
            }
            let z = q_sq * d * d;
            // l was validated above, the tabulated form cannot fail here.
            let barrier_sq = blatt_weisskopf_sq(l, z).unwrap_or(0.0) / barrier_at_pole;
            let q_ratio_sq = q_sq / q0_sq;
            let running_width =
                width * q_ratio_sq.powi(l as i32) * q_ratio_sq.sqrt() * (mass / s.sqrt())
                    * barrier_sq;
            let numerator = q_ratio_sq.sqrt().powi(l as i32) * barrier_sq.sqrt();
            let denominator = Complex64::new(mass * mass - s, -mass * running_width);
            Complex64::new(numerator, 0.0) / denominator
        }))
    }
}

/// Builder for the Flatte-style multichannel Breit-Wigner.
///
/// Per-channel widths run as `gsq * q^(2l+1) * B'_l(q) / sqrt(s)` without a
/// pole-momentum normalization, so channels whose threshold lies above the
/// pole mass are legal; their width contribution is zero below threshold.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultichannelBreitWigner;

impl LineshapeBuilder for MultichannelBreitWigner {
    fn build(&self, ctx: &BuildContext<'_>) -> Result<LineshapeFn, AmpError> {
        let def: MultichannelBreitWignerDef = ctx.decode()?;
        if def.channels.is_empty() {
            return Err(lineshape_error(
                ErrorInfo::new("no-channels", "multichannel lineshape needs at least one channel")
                    .with_context("function", ctx.function_name.to_string()),
            ));
        }
        for channel in &def.channels {
            blatt_weisskopf_sq(channel.l, 1.0)?;
        }
        let MultichannelBreitWignerDef { mass, channels } = def;
        Ok(Arc::new(move |s: f64| {
            let mut total_width = 0.0;
            if s > 0.0 {
                for channel in &channels {
                    let q_sq = breakup_momentum_sq(s, channel.ma, channel.mb);
                    // Closed channels contribute no width.
                    if q_sq <= 0.0 {
                        continue;
                    }
                    let q = q_sq.sqrt();
                    let barrier_sq =
                        blatt_weisskopf_sq(channel.l, q_sq * channel.d * channel.d).unwrap_or(0.0);
                    total_width +=
                        channel.gsq * q.powi(2 * channel.l as i32 + 1) * barrier_sq / s.sqrt();
                }
            }
            let denominator = Complex64::new(mass * mass - s, -mass * total_width);
            Complex64::new(1.0, 0.0) / denominator
        }))
    }
}
