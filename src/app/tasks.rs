//! Task callbacks — what each scheduler slot does when it fires.
//!
//! [`TaskDispatch`] is built per iteration from disjoint borrows of the
//! [`FsmContext`](crate::fsm::context::FsmContext) fields, so the scheduler
//! can stay mutably borrowed while callbacks write sensor readings, signals
//! and output commands.

use log::{debug, warn};

use super::ports::{SchedulerDelegate, SensorPort};
use crate::config::SystemConfig;
use crate::error::SensorFault;
use crate::events::{InputRegister, InputSignal};
use crate::fsm::context::{AlarmCause, OutputCommands, SensorSnapshot};
use crate::fsm::states::{render_alarm_message, render_environment, render_event};
use crate::scheduler::TaskId;

pub struct TaskDispatch<'a, S: SensorPort> {
    pub hw: &'a mut S,
    pub config: &'a SystemConfig,
    pub input: &'a mut InputRegister,
    pub sensors: &'a mut SensorSnapshot,
    pub outputs: &'a mut OutputCommands,
    pub alarm_cause: Option<AlarmCause>,
    pub alarm_tone_high: &'a mut bool,
}

impl<S: SensorPort> TaskDispatch<'_, S> {
    fn poll_climate(&mut self) {
        match self.hw.read_climate() {
            Ok(reading) => {
                self.sensors.climate = Some(reading);
                self.sensors.clear_fault(SensorFault::Climate);
                // Strictly greater: exactly at the limit is not an alarm.
                if reading.temperature_c > self.config.temperature_alarm_c {
                    debug!(
                        "Climate: {:.1}C above {:.1}C",
                        reading.temperature_c, self.config.temperature_alarm_c
                    );
                    self.input.set(InputSignal::PrimaryThresholdEvent);
                }
            }
            Err(e) => {
                warn!("Climate read failed: {e}");
                self.sensors.climate = None;
                self.sensors.set_fault(SensorFault::Climate);
            }
        }
        render_environment(self.sensors, &mut self.outputs.display);
    }

    fn poll_light(&mut self) {
        match self.hw.read_light() {
            Ok(raw) => {
                self.sensors.light = Some(raw);
                self.sensors.clear_fault(SensorFault::Light);
            }
            Err(e) => {
                warn!("Light read failed: {e}");
                self.sensors.light = None;
                self.sensors.set_fault(SensorFault::Light);
            }
        }
        render_environment(self.sensors, &mut self.outputs.display);
    }

    fn poll_motion(&mut self) {
        let motion = self.read_flag(SensorFault::Motion, |hw| hw.read_motion());
        let magnetic = self.read_flag(SensorFault::Magnetic, |hw| hw.read_magnetic());
        self.sensors.motion = motion;
        self.sensors.magnetic = magnetic;
        if motion || magnetic {
            debug!("Event: motion={motion} field={magnetic}");
            self.input.set(InputSignal::SecondaryEvent);
        }
        render_event(self.sensors, &mut self.outputs.display);
    }

    /// A failed binary read counts as "not detected" and raises the fault bit.
    fn read_flag(
        &mut self,
        fault: SensorFault,
        read: impl FnOnce(&mut S) -> Result<bool, crate::error::SensorError>,
    ) -> bool {
        match read(&mut *self.hw) {
            Ok(v) => {
                self.sensors.clear_fault(fault);
                v
            }
            Err(e) => {
                warn!("{fault} read failed: {e}");
                self.sensors.set_fault(fault);
                false
            }
        }
    }

    fn alarm_blink(&mut self) {
        self.outputs.led_on = !self.outputs.led_on;
        *self.alarm_tone_high = !*self.alarm_tone_high;
        let (low, high) = self.config.alarm_tones_hz;
        self.outputs.buzzer_hz = Some(if *self.alarm_tone_high { high } else { low });
    }
}

impl<S: SensorPort> SchedulerDelegate for TaskDispatch<'_, S> {
    fn on_task_fired(&mut self, task: TaskId) {
        match task {
            TaskId::ClimatePoll => self.poll_climate(),
            TaskId::LightPoll => self.poll_light(),
            TaskId::MotionPoll => self.poll_motion(),
            TaskId::EnvironmentCycle | TaskId::EventCycle => self.input.mark_cycle_elapsed(),
            TaskId::LockoutTimer => {
                self.input.set(InputSignal::TimeExpired);
            }
            TaskId::LockedBlink => self.outputs.led_on = !self.outputs.led_on,
            TaskId::AlarmBlink => self.alarm_blink(),
            TaskId::AlarmBanner => render_alarm_message(self.alarm_cause, &mut self.outputs.display),
        }
    }
}
