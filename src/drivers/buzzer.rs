//! Piezo buzzer.
//!
//! Tone generation itself (LEDC / timer PWM) is a collaborator behind
//! [`ToneGenerator`]. [`Buzzer`] remembers the active tone and skips writes
//! that would not change it, since the controller re-applies outputs every
//! iteration.

use core::fmt;

use crate::error::OutputError;

pub trait ToneGenerator {
    type Error: fmt::Debug;

    fn start_tone(&mut self, hz: u16) -> Result<(), Self::Error>;

    fn stop_tone(&mut self) -> Result<(), Self::Error>;
}

pub struct Buzzer<T> {
    generator: T,
    current: Option<u16>,
}

impl<T: ToneGenerator> Buzzer<T> {
    pub fn new(generator: T) -> Self {
        Self {
            generator,
            current: None,
        }
    }

    /// `Some(hz)` for a tone, `None` for silence.
    pub fn set(&mut self, tone_hz: Option<u16>) -> Result<(), OutputError> {
        if tone_hz == self.current {
            return Ok(());
        }
        let result = match tone_hz {
            Some(hz) => self.generator.start_tone(hz),
            None => self.generator.stop_tone(),
        };
        result.map_err(|_| OutputError::ToneFailed)?;
        self.current = tone_hz;
        Ok(())
    }

    pub fn current(&self) -> Option<u16> {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    #[derive(Default)]
    struct CountingGenerator {
        writes: u32,
    }

    impl ToneGenerator for CountingGenerator {
        type Error = Infallible;

        fn start_tone(&mut self, _hz: u16) -> Result<(), Infallible> {
            self.writes += 1;
            Ok(())
        }

        fn stop_tone(&mut self) -> Result<(), Infallible> {
            self.writes += 1;
            Ok(())
        }
    }

    #[test]
    fn skips_redundant_writes() {
        let mut buzzer = Buzzer::new(CountingGenerator::default());
        buzzer.set(Some(1000)).unwrap();
        buzzer.set(Some(1000)).unwrap();
        buzzer.set(Some(1500)).unwrap();
        buzzer.set(None).unwrap();
        buzzer.set(None).unwrap();
        assert_eq!(buzzer.generator.writes, 3);
        assert_eq!(buzzer.current(), None);
    }
}
