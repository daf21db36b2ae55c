//! The typed parameter set of a composite background + Gaussian peaks model.
//!
//! Parameters are addressed through [`ParamSlot`] instead of string keys. The
//! optimizer only sees the varying slots, in the order given by
//! [`FitParameters::varying_slots`], packed into an `Array1<f64>`.

use crate::error::{PeakFitError, Result};
use crate::models::{gaussian, BackgroundModel, PeakParameters, Width};
use crate::parameters::Parameter;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Address of one parameter inside [`FitParameters`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamSlot {
    /// Background coefficient by position in the model's coefficient list
    Background(usize),
    Amplitude(usize),
    Center(usize),
    /// The owned width of the given peak
    Width(usize),
}

/// Background coefficients plus one parameter block per peak.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitParameters {
    pub background: BackgroundModel,
    pub peaks: Vec<PeakParameters>,
}

impl FitParameters {
    /// Build a parameter set, checking that every shared width refers to a
    /// peak that owns its width.
    pub fn new(background: BackgroundModel, peaks: Vec<PeakParameters>) -> Result<Self> {
        for (i, peak) in peaks.iter().enumerate() {
            if let Width::SharesWidthOf(target) = peak.width {
                let valid = peaks
                    .get(target)
                    .map(|p| p.own_width().is_some())
                    .unwrap_or(false);
                if !valid {
                    return Err(PeakFitError::ParameterError(format!(
                        "peak {} shares the width of peak {}, which does not own one",
                        i, target
                    )));
                }
            }
        }
        Ok(Self { background, peaks })
    }

    /// Background-only parameter set.
    pub fn background_only(background: BackgroundModel) -> Self {
        Self {
            background,
            peaks: Vec::new(),
        }
    }

    /// All slots, background first, then amplitude/center/width per peak.
    pub fn slots(&self) -> Vec<ParamSlot> {
        let mut slots: Vec<ParamSlot> = (0..self.background.coefficients().len())
            .map(ParamSlot::Background)
            .collect();
        for (i, peak) in self.peaks.iter().enumerate() {
            slots.push(ParamSlot::Amplitude(i));
            slots.push(ParamSlot::Center(i));
            if peak.own_width().is_some() {
                slots.push(ParamSlot::Width(i));
            }
        }
        slots
    }

    pub fn varying_slots(&self) -> Vec<ParamSlot> {
        self.slots()
            .into_iter()
            .filter(|&slot| self.get(slot).map(|p| p.vary).unwrap_or(false))
            .collect()
    }

    pub fn get(&self, slot: ParamSlot) -> Option<&Parameter> {
        match slot {
            ParamSlot::Background(i) => self.background.coefficients().get(i).copied(),
            ParamSlot::Amplitude(i) => self.peaks.get(i).map(|p| &p.amplitude),
            ParamSlot::Center(i) => self.peaks.get(i).map(|p| &p.center),
            ParamSlot::Width(i) => self.peaks.get(i).and_then(|p| p.own_width()),
        }
    }

    pub fn get_mut(&mut self, slot: ParamSlot) -> Option<&mut Parameter> {
        match slot {
            ParamSlot::Background(i) => self.background.coefficients_mut().into_iter().nth(i),
            ParamSlot::Amplitude(i) => self.peaks.get_mut(i).map(|p| &mut p.amplitude),
            ParamSlot::Center(i) => self.peaks.get_mut(i).map(|p| &mut p.center),
            ParamSlot::Width(i) => self.peaks.get_mut(i).and_then(|p| p.own_width_mut()),
        }
    }

    /// The slot holding the width used by `peak`.
    pub fn width_slot(&self, peak: usize) -> Option<ParamSlot> {
        match &self.peaks.get(peak)?.width {
            Width::Owned(_) => Some(ParamSlot::Width(peak)),
            Width::SharesWidthOf(target) => Some(ParamSlot::Width(*target)),
        }
    }

    /// The width value used by `peak`, following a shared reference.
    pub fn width_of(&self, peak: usize) -> f64 {
        self.width_slot(peak)
            .and_then(|slot| self.get(slot))
            .map(|p| p.value())
            .unwrap_or(0.0)
    }

    /// Number of parameters the optimizer varies.
    pub fn varying_count(&self) -> usize {
        self.varying_slots().len()
    }

    /// Pack the varying parameters into the optimizer's unbounded space.
    pub fn to_internal(&self) -> Result<Array1<f64>> {
        self.varying_slots()
            .into_iter()
            .map(|slot| self.expect_slot(slot)?.to_internal().map_err(PeakFitError::from))
            .collect::<Result<Vec<f64>>>()
            .map(Array1::from_vec)
    }

    /// Unpack optimizer values onto the varying parameters.
    pub fn set_from_internal(&mut self, internal: &Array1<f64>) -> Result<()> {
        let slots = self.check_len(internal)?;
        for (slot, &value) in slots.into_iter().zip(internal.iter()) {
            self.expect_slot_mut(slot)?.set_from_internal(value);
        }
        Ok(())
    }

    /// Current values of the varying parameters.
    pub fn to_external(&self) -> Array1<f64> {
        self.varying_slots()
            .into_iter()
            .filter_map(|slot| self.get(slot).map(|p| p.value()))
            .collect()
    }

    /// Overwrite the varying parameters with external values, without clamping.
    ///
    /// Used for Jacobians in physical units, where a probe may step just past a
    /// bound.
    pub fn set_external_unclamped(&mut self, values: &Array1<f64>) -> Result<()> {
        let slots = self.check_len(values)?;
        for (slot, &value) in slots.into_iter().zip(values.iter()) {
            self.expect_slot_mut(slot)?.set_value_unclamped(value);
        }
        Ok(())
    }

    /// Composite model value at `x`.
    pub fn evaluate(&self, x: f64) -> f64 {
        self.background.evaluate(x) + self.peaks_at(x).iter().sum::<f64>()
    }

    /// The contribution of each peak at `x`.
    pub fn peaks_at(&self, x: f64) -> Vec<f64> {
        self.peaks
            .iter()
            .enumerate()
            .map(|(i, peak)| {
                gaussian(
                    x,
                    peak.amplitude.value(),
                    peak.center.value(),
                    self.width_of(i),
                )
            })
            .collect()
    }

    /// Report name of a slot.
    pub fn name_of(&self, slot: ParamSlot) -> String {
        self.get(slot).map(|p| p.name.clone()).unwrap_or_default()
    }

    fn check_len(&self, values: &Array1<f64>) -> Result<Vec<ParamSlot>> {
        let slots = self.varying_slots();
        if slots.len() != values.len() {
            return Err(PeakFitError::DimensionMismatch(format!(
                "Expected {} varying parameters, got {}",
                slots.len(),
                values.len()
            )));
        }
        Ok(slots)
    }

    fn expect_slot(&self, slot: ParamSlot) -> Result<&Parameter> {
        self.get(slot)
            .ok_or_else(|| PeakFitError::ParameterError(format!("no parameter at {:?}", slot)))
    }

    fn expect_slot_mut(&mut self, slot: ParamSlot) -> Result<&mut Parameter> {
        self.get_mut(slot)
            .ok_or_else(|| PeakFitError::ParameterError(format!("no parameter at {:?}", slot)))
    }
}
