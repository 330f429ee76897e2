//! A platform agnostic Rust driver for the Vishay VEML6040 RGBW color sensor based on the
//! [`embedded-hal`](https://github.com/rust-embedded/embedded-hal) traits.
//!
//! ## Overview
//!
//! The VEML6040 senses red, green, blue and white light through four 16-bit channels behind an
//! I2C interface. Besides raw channel counts this driver derives ambient light (lux),
//! correlated color temperature and HSV values, and names the dominant hue.
//!
//! * [Datasheet](https://www.vishay.com/docs/84276/veml6040.pdf)
//!
//! ## Usage
//!
//! ### Creation
//!
//! Import the crate and the `embedded-hal` implementation to instantiate the device. Creation
//! fails with [`Error::DeviceNotFound`] if nothing acknowledges the device address.
//! ```no_run
//! use linux_embedded_hal as hal;
//!
//! use hal::I2cdev;
//! use veml6040::Veml6040;
//!
//! # fn main() {
//! let dev = I2cdev::new("/dev/i2c-1").unwrap();
//! let mut veml6040 = Veml6040::new(dev).unwrap();
//! # }
//! ```
//!
//! ### Measurement
//! Channel reads never fail hard: a bus error shows up as `None` in the affected quantity, so
//! callers can simply keep polling.
//!
//!```no_run
//! use linux_embedded_hal as hal;
//!
//! use hal::{Delay, I2cdev};
//! use embedded_hal::delay::DelayNs;
//! use veml6040::{Config, IntegrationTime, Veml6040};
//!
//! # fn main() {
//! # let dev = I2cdev::new("/dev/i2c-1").unwrap();
//! # let mut veml6040 = Veml6040::new(dev).unwrap();
//! veml6040
//!     .set_config(Config {
//!         integration_time: IntegrationTime::Ms320,
//!         ..Config::default()
//!     })
//!     .unwrap();
//!
//! loop {
//!     if let Some(lux) = veml6040.measure_lux() {
//!         println!("Ambient light: {lux} lx");
//!     }
//!     if let Some(hue) = veml6040.classify_hue() {
//!         println!("Dominant hue: {hue}");
//!     }
//!
//!     Delay.delay_ms(1000u32);
//! }
//! # }
//! ```
#![cfg_attr(not(test), no_std)]
use embedded_hal::i2c::{Error as _, ErrorKind, I2c};
use num_enum::IntoPrimitive;

pub mod color;
pub mod config;

pub use color::{Hsv, HueName};
pub use config::{encode, sensitivity_for, Config, IntegrationTime};

#[derive(IntoPrimitive)]
#[repr(u8)]
enum Register {
    Conf = 0x00,
}

/// A color channel and its data register.
#[derive(IntoPrimitive)]
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum Channel {
    Red = 0x08,
    Green = 0x09,
    Blue = 0x0A,
    White = 0x0B,
}

#[derive(Debug, Copy, Clone)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum Error<T> {
    /// An error with the usage of the I2C interface occurred.
    Interface(T),

    /// No device acknowledged the configured address.
    DeviceNotFound,
}

impl<T> From<T> for Error<T> {
    fn from(e: T) -> Self {
        Self::Interface(e)
    }
}

/// Raw counts of all four channels. A `None` channel could not be read.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct RawChannels {
    pub red: Option<u16>,
    pub green: Option<u16>,
    pub blue: Option<u16>,
    pub white: Option<u16>,
}

/// Channel counts together with the quantities derived from them.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct ColorReading {
    pub red: Option<u16>,
    pub green: Option<u16>,
    pub blue: Option<u16>,
    pub white: Option<u16>,

    /// Ambient light in lux, derived from the green channel.
    pub als: Option<u32>,

    /// Correlated color temperature in Kelvin (McCamy's approximation).
    pub cct: Option<f32>,
}

/// The default I2C address of the device.
pub const DEFAULT_ADDR: u8 = 0x10;

#[derive(Clone, Debug)]
pub struct Veml6040<T> {
    addr: u8,
    device: T,
    config: u8,
}

impl<T> Veml6040<T>
where
    T: I2c,
{
    /// Construct the driver at the default address and apply the default configuration
    /// (160ms integration time, auto mode, powered on).
    pub fn new(device: T) -> Result<Self, Error<T::Error>> {
        Self::new_with_address(device, DEFAULT_ADDR)
    }

    /// Construct the driver for a device at `addr`.
    ///
    /// The address is probed first; [`Error::DeviceNotFound`] is returned if the probe is not
    /// acknowledged.
    pub fn new_with_address(device: T, addr: u8) -> Result<Self, Error<T::Error>> {
        let mut veml6040 = Self {
            addr,
            device,
            config: 0,
        };

        veml6040.probe()?;
        veml6040.configure(Config::default().bits())?;

        Ok(veml6040)
    }

    /// Release the underlying I2C bus.
    pub fn release(self) -> T {
        self.device
    }

    /// The configuration byte last written successfully.
    pub fn config(&self) -> u8 {
        self.config
    }

    fn probe(&mut self) -> Result<(), Error<T::Error>> {
        match self.device.write(self.addr, &[]) {
            Ok(()) => Ok(()),
            Err(e) if matches!(e.kind(), ErrorKind::NoAcknowledge(_)) => Err(Error::DeviceNotFound),
            Err(e) => Err(Error::Interface(e)),
        }
    }

    /// Write a raw configuration byte to the device.
    ///
    /// The stored configuration is only updated once the write succeeds, so a failed write
    /// leaves [`Self::config`] describing what the device was last told.
    pub fn configure(&mut self, config: u8) -> Result<(), Error<T::Error>> {
        let result = self.write_reg(Register::Conf, config);

        match result {
            Ok(()) => self.config = config,
            Err(_) => {
                #[cfg(feature = "defmt-03")]
                defmt::warn!("VEML6040: writing configuration {=u8:#x} failed", config);
            }
        }

        result
    }

    /// Write a typed configuration to the device.
    pub fn set_config(&mut self, config: Config) -> Result<(), Error<T::Error>> {
        self.configure(config.bits())
    }

    /// Put the sensor into shutdown, keeping the rest of the configuration.
    pub fn shutdown(&mut self) -> Result<(), Error<T::Error>> {
        self.configure(config::with_shutdown(self.config, true))
    }

    /// Power the sensor back on, keeping the rest of the configuration.
    pub fn wake(&mut self) -> Result<(), Error<T::Error>> {
        self.configure(config::with_shutdown(self.config, false))
    }

    /// Start a single measurement cycle.
    ///
    /// # Note
    /// Only meaningful in force mode. The device clears the trigger bit itself once the
    /// measurement completes, so the stored configuration keeps it cleared.
    pub fn trigger_measurement(&mut self) -> Result<(), Error<T::Error>> {
        let current = self.config;
        self.write_reg(Register::Conf, config::with_trigger(current, true))?;
        self.config = config::with_trigger(current, false);
        Ok(())
    }

    fn write_reg(&mut self, reg: Register, value: u8) -> Result<(), Error<T::Error>> {
        // Configuration is written as a 16-bit little-endian word with a zero high byte.
        self.device.write(self.addr, &[reg.into(), value, 0])?;
        Ok(())
    }

    /// Read the raw count of a single channel, or `None` if the bus transaction failed.
    pub fn read_channel(&mut self, channel: Channel) -> Option<u16> {
        let mut bytes = [0u8; 2];
        match self
            .device
            .write_read(self.addr, &[channel.into()], &mut bytes[..])
        {
            Ok(()) => Some(u16::from_le_bytes(bytes)),
            Err(_) => {
                #[cfg(feature = "defmt-03")]
                defmt::warn!("VEML6040: reading {} channel failed", channel);
                None
            }
        }
    }

    /// Read the raw red channel count.
    pub fn read_red(&mut self) -> Option<u16> {
        self.read_channel(Channel::Red)
    }

    /// Read the raw green channel count.
    pub fn read_green(&mut self) -> Option<u16> {
        self.read_channel(Channel::Green)
    }

    /// Read the raw blue channel count.
    pub fn read_blue(&mut self) -> Option<u16> {
        self.read_channel(Channel::Blue)
    }

    /// Read the raw white channel count.
    pub fn read_white(&mut self) -> Option<u16> {
        self.read_channel(Channel::White)
    }

    /// Read all four channels in red, green, blue, white order.
    pub fn read_channels(&mut self) -> RawChannels {
        RawChannels {
            red: self.read_red(),
            green: self.read_green(),
            blue: self.read_blue(),
            white: self.read_white(),
        }
    }

    fn lux_from_green(&self, green: u16) -> u32 {
        // f64: in f32, 6250 * 0.25168 truncates to 1572 instead of 1573.
        (green as f64 * sensitivity_for(self.config)) as u32
    }

    /// Measure the ambient light level in lux.
    ///
    /// # Note
    /// The conversion coefficient follows the integration time of the current configuration,
    /// so the result stays consistent across configuration changes.
    pub fn measure_lux(&mut self) -> Option<u32> {
        let green = self.read_green()?;
        Some(self.lux_from_green(green))
    }

    /// Estimate the correlated color temperature in Kelvin from the `(R - B) / G` ratio.
    pub fn measure_cct(&mut self) -> Option<f32> {
        self.measure_cct_with_offset(0.0)
    }

    /// Like [`Self::measure_cct`], adding `offset` to the ratio to compensate for coverglass or
    /// a known light source.
    pub fn measure_cct_with_offset(&mut self, offset: f32) -> Option<f32> {
        let red = self.read_red();
        let green = self.read_green();
        let blue = self.read_blue();

        color::cct_from_ratio(red?, green?, blue?, offset)
    }

    /// Read all channels and derive ambient light and color temperature from them.
    ///
    /// Returns an empty reading if red, green or blue could not be read or if the channels
    /// carry no light at all. A color temperature that cannot be computed only clears
    /// [`ColorReading::cct`].
    pub fn read_rgb(&mut self) -> ColorReading {
        let channels = self.read_channels();
        let (Some(red), Some(green), Some(blue)) = (channels.red, channels.green, channels.blue)
        else {
            return ColorReading::default();
        };

        if color::chromaticity(red, green, blue).is_none() {
            return ColorReading::default();
        }

        ColorReading {
            red: Some(red),
            green: Some(green),
            blue: Some(blue),
            white: channels.white,
            als: (green != 0).then(|| self.lux_from_green(green)),
            cct: color::cct_mccamy(red, green, blue),
        }
    }

    /// Read the color as hue, saturation and value.
    pub fn read_hsv(&mut self) -> Option<Hsv> {
        let reading = self.read_rgb();
        Some(Hsv::from_rgb(reading.red?, reading.green?, reading.blue?))
    }

    /// Name the dominant hue, or `None` if no color could be measured or there is no light.
    pub fn classify_hue(&mut self) -> Option<HueName> {
        let hsv = self.read_hsv()?;
        if hsv.val <= 0.0 {
            return None;
        }

        Some(HueName::closest(hsv.hue))
    }
}
