//! Configuration register (`CONF`, command code 0x00) encoding.
//!
//! The register is a single byte made of four independent fields:
//!
//! | Bits | Field                        |
//! |------|------------------------------|
//! | 6:4  | Integration time (`IT`)      |
//! | 2    | Trigger one measurement (`TRIG`) |
//! | 1    | Force mode (`AF`)            |
//! | 0    | Shutdown (`SD`)              |
use core::convert::TryFrom;
use num_enum::{IntoPrimitive, TryFromPrimitive};

const IT_SHIFT: u8 = 4;
const IT_MASK: u8 = 0b0111_0000;
const TRIG_BIT: u8 = 1 << 2;
const AF_BIT: u8 = 1 << 1;
const SD_BIT: u8 = 1 << 0;

/// Integration time of each measurement cycle.
///
/// Longer integration times raise sensitivity at the cost of a lower maximum detectable
/// illuminance.
#[derive(IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum IntegrationTime {
    Ms40 = 0b000,
    Ms80 = 0b001,
    Ms160 = 0b010,
    Ms320 = 0b011,
    Ms640 = 0b100,
    Ms1280 = 0b101,
}

impl IntegrationTime {
    /// Green channel resolution in lux per count.
    pub fn g_sensitivity(self) -> f64 {
        match self {
            IntegrationTime::Ms40 => 0.25168,
            IntegrationTime::Ms80 => 0.12584,
            IntegrationTime::Ms160 => 0.06292,
            IntegrationTime::Ms320 => 0.03146,
            IntegrationTime::Ms640 => 0.01573,
            IntegrationTime::Ms1280 => 0.007865,
        }
    }

    /// Extract the integration time field of a configuration byte.
    ///
    /// Returns `None` for the two reserved encodings (`0b110`, `0b111`).
    pub fn from_config_bits(config: u8) -> Option<Self> {
        Self::try_from((config & IT_MASK) >> IT_SHIFT).ok()
    }

    fn to_config_bits(self) -> u8 {
        Into::<u8>::into(self) << IT_SHIFT
    }
}

impl Default for IntegrationTime {
    fn default() -> Self {
        IntegrationTime::Ms160
    }
}

/// Typed view of the configuration register.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct Config {
    pub integration_time: IntegrationTime,

    /// Start a single measurement. Only meaningful in force mode; the device clears the bit
    /// once the measurement completes.
    pub trigger: bool,

    /// `false` selects auto mode (continuous measurements), `true` selects force mode.
    pub force_mode: bool,

    /// Put the color sensor in shutdown.
    pub shutdown: bool,
}

impl Config {
    /// Pack the fields into the register byte.
    pub fn bits(&self) -> u8 {
        encode(
            self.integration_time,
            self.trigger,
            self.force_mode,
            self.shutdown,
        )
    }

    /// Unpack a register byte.
    ///
    /// Returns `None` if the integration time field holds a reserved encoding.
    pub fn from_bits(bits: u8) -> Option<Self> {
        Some(Self {
            integration_time: IntegrationTime::from_config_bits(bits)?,
            trigger: bits & TRIG_BIT != 0,
            force_mode: bits & AF_BIT != 0,
            shutdown: bits & SD_BIT != 0,
        })
    }
}

impl From<Config> for u8 {
    fn from(config: Config) -> u8 {
        config.bits()
    }
}

/// Pack the configuration fields into a register byte.
pub fn encode(
    integration_time: IntegrationTime,
    trigger: bool,
    force_mode: bool,
    shutdown: bool,
) -> u8 {
    let mut bits = integration_time.to_config_bits();
    if trigger {
        bits |= TRIG_BIT;
    }
    if force_mode {
        bits |= AF_BIT;
    }
    if shutdown {
        bits |= SD_BIT;
    }
    bits
}

/// Green channel sensitivity (lux per count) for a raw configuration byte.
///
/// Reserved integration time encodings fall back to the 160ms coefficient.
pub fn sensitivity_for(config: u8) -> f64 {
    IntegrationTime::from_config_bits(config)
        .unwrap_or(IntegrationTime::Ms160)
        .g_sensitivity()
}

pub(crate) fn with_trigger(config: u8, trigger: bool) -> u8 {
    if trigger {
        config | TRIG_BIT
    } else {
        config & !TRIG_BIT
    }
}

pub(crate) fn with_shutdown(config: u8, shutdown: bool) -> u8 {
    if shutdown {
        config | SD_BIT
    } else {
        config & !SD_BIT
    }
}
