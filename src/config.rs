//! Species-level ionization settings, as handed over by the host code's
//! configuration reader.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{IonizationError, Result};

/// Ionization model of an ion species.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum IonizationModel {
    #[serde(rename = "none")]
    None,
    /// ADK tunnelling rate.
    #[serde(rename = "tunnel")]
    Tunnel,
    /// PPT rate including the magnetic quantum number.
    #[serde(rename = "tunnel_full_PPT")]
    TunnelFullPpt,
    /// Tong-Lin corrected tunnelling rate.
    #[serde(rename = "tunnel_TL")]
    TunnelTongLin,
    /// Tunnelling rate saturated by the barrier-suppression bounds.
    #[serde(rename = "tunnel_BSI")]
    TunnelBsi,
    /// Cycle-averaged rate driven by a laser envelope.
    #[serde(rename = "tunnel_envelope_averaged")]
    TunnelEnvelopeAveraged,
    /// Electron-impact ionization in binary collisions.
    #[serde(rename = "collisional")]
    Collisional,
}

impl IonizationModel {
    pub fn name(&self) -> &'static str {
        match self {
            IonizationModel::None => "none",
            IonizationModel::Tunnel => "tunnel",
            IonizationModel::TunnelFullPpt => "tunnel_full_PPT",
            IonizationModel::TunnelTongLin => "tunnel_TL",
            IonizationModel::TunnelBsi => "tunnel_BSI",
            IonizationModel::TunnelEnvelopeAveraged => "tunnel_envelope_averaged",
            IonizationModel::Collisional => "collisional",
        }
    }

    /// Whether the model is driven by the local field (as opposed to collisions).
    pub fn is_field_ionization(&self) -> bool {
        !matches!(self, IonizationModel::None | IonizationModel::Collisional)
    }
}

impl fmt::Display for IonizationModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IonizationModel {
    type Err = IonizationError;

    fn from_str(s: &str) -> Result<Self> {
        let model = match s {
            "none" => IonizationModel::None,
            "tunnel" => IonizationModel::Tunnel,
            "tunnel_full_PPT" => IonizationModel::TunnelFullPpt,
            "tunnel_TL" => IonizationModel::TunnelTongLin,
            "tunnel_BSI" => IonizationModel::TunnelBsi,
            "tunnel_envelope_averaged" => IonizationModel::TunnelEnvelopeAveraged,
            "collisional" => IonizationModel::Collisional,
            other => {
                return Err(IonizationError::InvalidConfig(format!(
                    "unknown ionization model '{}'",
                    other
                )))
            }
        };
        Ok(model)
    }
}

/// Laser polarization of the envelope model.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum Polarization {
    Linear,
    Circular,
}

impl Polarization {
    /// Only ellipticity 0 (linear) and 1 (circular) are supported.
    pub fn from_ellipticity(ellipticity: f64) -> Result<Self> {
        if ellipticity == 0.0 {
            Ok(Polarization::Linear)
        } else if ellipticity == 1.0 {
            Ok(Polarization::Circular)
        } else {
            Err(IonizationError::InvalidEllipticity(ellipticity))
        }
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[serde(default)]
pub struct IonizationConfig {
    pub model: IonizationModel,
    /// Laser ellipticity, envelope model only.
    pub ellipticity: f64,
    /// Angle of the polarization direction in the transverse plane [rad], envelope model only.
    pub polarization_phi: f64,
    /// Tong-Lin exponent parameter, typically between 6 and 9.
    pub tl_parameter: f64,
    /// Timestep (code units).
    pub timestep: f64,
    /// Reference angular frequency [rad/s].
    pub reference_angular_frequency: f64,
    /// Record the charge of every ion at the moment it is ionized.
    pub save_ion_charge: bool,
}

impl Default for IonizationConfig {
    fn default() -> Self {
        IonizationConfig {
            model: IonizationModel::None,
            ellipticity: 0.0,
            polarization_phi: 0.0,
            tl_parameter: 6.0,
            timestep: 0.1,
            // 0.8 um laser
            reference_angular_frequency: 2.354564459e15,
            save_ion_charge: false,
        }
    }
}

impl IonizationConfig {
    pub fn new(model: IonizationModel) -> Self {
        IonizationConfig { model, ..Default::default() }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.timestep > 0.0) || !self.timestep.is_finite() {
            return Err(IonizationError::InvalidConfig(format!(
                "timestep must be positive, got {}",
                self.timestep
            )));
        }
        if !(self.reference_angular_frequency > 0.0) || !self.reference_angular_frequency.is_finite() {
            return Err(IonizationError::InvalidConfig(format!(
                "reference angular frequency must be positive, got {}",
                self.reference_angular_frequency
            )));
        }
        if self.model == IonizationModel::TunnelEnvelopeAveraged {
            Polarization::from_ellipticity(self.ellipticity)?;
        }
        Ok(())
    }
}
