//! GPIO adapters built on `embedded-hal` 1.0 digital traits.
//!
//! Any HAL that implements `OutputPin` / `InputPin` (esp-idf-hal,
//! rp2040-hal, linux-embedded-hal, ...) plugs in here without the core
//! knowing which board it runs on.
//!
//! | Adapter              | Wraps                      | Provides              |
//! |----------------------|----------------------------|-----------------------|
//! | `IndicatedSensor`    | any driver + `OutputPin`   | LED follows the gate  |
//! | `DigitalLightSensor` | comparator `InputPin`      | lit / dark reading    |

use embedded_hal::digital::{InputPin, OutputPin};
use log::warn;

use crate::app::ports::SensorDriver;
use crate::error::SensorError;

/// Reading reported by [`DigitalLightSensor`] for a dark room.  Always
/// above any sane `light_on_threshold`.
pub const DARK_READING: f32 = f32::MAX;

/// Reading reported by [`DigitalLightSensor`] for a lit room.
pub const LIT_READING: f32 = 0.0;

/// A sensor with an LED that mirrors its debounced state.
pub struct IndicatedSensor<D, P> {
    inner: D,
    led: P,
}

impl<D, P> IndicatedSensor<D, P>
where
    D: SensorDriver,
    P: OutputPin + Send,
{
    pub fn new(inner: D, led: P) -> Self {
        Self { inner, led }
    }

    pub fn into_parts(self) -> (D, P) {
        (self.inner, self.led)
    }
}

impl<D, P> SensorDriver for IndicatedSensor<D, P>
where
    D: SensorDriver,
    P: OutputPin + Send,
{
    fn read(&mut self) -> Result<f32, SensorError> {
        self.inner.read()
    }

    fn set_indicator(&mut self, on: bool) {
        let res = if on {
            self.led.set_high()
        } else {
            self.led.set_low()
        };
        if let Err(e) = res {
            warn!("indicator write failed: {:?}", e);
        }
    }
}

/// Photoresistor module with an on-board comparator (digital output).
///
/// Most such modules pull the output LOW when light exceeds the trim-pot
/// threshold, hence `active_low` defaults to `true`.
pub struct DigitalLightSensor<P> {
    pin: P,
    active_low: bool,
}

impl<P: InputPin + Send> DigitalLightSensor<P> {
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            active_low: true,
        }
    }

    /// Module drives the pin HIGH when lit.
    pub fn active_high(mut self) -> Self {
        self.active_low = false;
        self
    }
}

impl<P: InputPin + Send> SensorDriver for DigitalLightSensor<P> {
    fn read(&mut self) -> Result<f32, SensorError> {
        let high = self.pin.is_high().map_err(|e| {
            warn!("light input read failed: {:?}", e);
            SensorError::ReadFailed
        })?;
        let lit = high != self.active_low;
        Ok(if lit { LIT_READING } else { DARK_READING })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;

    #[derive(Default)]
    struct TestPin {
        high: bool,
        writes: usize,
    }

    impl ErrorType for TestPin {
        type Error = Infallible;
    }

    impl OutputPin for TestPin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.high = false;
            self.writes += 1;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.high = true;
            self.writes += 1;
            Ok(())
        }
    }

    impl InputPin for TestPin {
        fn is_high(&mut self) -> Result<bool, Infallible> {
            Ok(self.high)
        }

        fn is_low(&mut self) -> Result<bool, Infallible> {
            Ok(!self.high)
        }
    }

    struct Fixed(f32);

    impl SensorDriver for Fixed {
        fn read(&mut self) -> Result<f32, SensorError> {
            Ok(self.0)
        }
    }

    #[test]
    fn indicator_drives_led_pin() {
        let mut s = IndicatedSensor::new(Fixed(7.5), TestPin::default());
        assert_eq!(s.read(), Ok(7.5));
        s.set_indicator(true);
        s.set_indicator(false);
        s.set_indicator(true);
        let (_, led) = s.into_parts();
        assert!(led.high);
        assert_eq!(led.writes, 3);
    }

    #[test]
    fn active_low_module_reads_lit_when_low() {
        let mut s = DigitalLightSensor::new(TestPin { high: false, writes: 0 });
        assert_eq!(s.read(), Ok(LIT_READING));
        let mut s = DigitalLightSensor::new(TestPin { high: true, writes: 0 });
        assert_eq!(s.read(), Ok(DARK_READING));
    }

    #[test]
    fn active_high_module_inverts() {
        let mut s = DigitalLightSensor::new(TestPin { high: true, writes: 0 }).active_high();
        assert_eq!(s.read(), Ok(LIT_READING));
    }
}
