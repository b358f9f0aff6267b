//! Clock divider and PWM timer register calculation
//!
//! A timer peripheral counts at `source / divider` and wraps after
//! `period + 1` ticks, so its output frequency is
//! `source / divider / (period + 1)`. The period register is 16 bits wide,
//! and the divider comes from a fixed ladder of powers of two.
//!
//! [`solve`] picks the smallest ladder divider whose period still fits the
//! register. Smaller dividers give a larger period and therefore finer duty
//! resolution. [`evaluate_ladder`] exposes every ladder step so other
//! selection policies can be built on the same data.
//!
//! # Example
//!
//! ```
//! use mcucalc::core::timer::solve;
//!
//! let pwm = solve(24_000_000.0, 1_000.0, 50.0).unwrap();
//! assert_eq!(pwm.divider, 1);
//! assert_eq!(pwm.period, 23_999);
//! assert_eq!(pwm.duty, 12_000);
//! assert!(!pwm.overflowed);
//! ```

use crate::core::error::Result;
use crate::validators::{validate_divider, validate_duty_percent, validate_frequency};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Supported clock pre-scaler values, ascending
pub const DIVIDER_LADDER: [u32; 8] = [1, 2, 4, 8, 16, 32, 64, 128];

/// Largest value of the 16-bit period register
pub const PERIOD_MAX: u16 = u16::MAX;

/// Frequency input units
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum FrequencyUnit {
    #[default]
    #[strum(serialize = "Hz")]
    Hz,
    #[strum(serialize = "kHz")]
    KHz,
    #[strum(serialize = "MHz")]
    MHz,
    #[strum(serialize = "GHz")]
    GHz,
}

impl FrequencyUnit {
    pub const fn hz_per_unit(self) -> f64 {
        match self {
            FrequencyUnit::Hz => 1.0,
            FrequencyUnit::KHz => 1e3,
            FrequencyUnit::MHz => 1e6,
            FrequencyUnit::GHz => 1e9,
        }
    }

    pub fn to_hz(self, value: f64) -> f64 {
        value * self.hz_per_unit()
    }
}

/// Time units for period output
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
pub enum TimeUnit {
    #[strum(serialize = "s")]
    Seconds,
    #[strum(serialize = "ms")]
    Milliseconds,
    #[strum(to_string = "μs", serialize = "us")]
    Microseconds,
    #[default]
    #[strum(serialize = "ns")]
    Nanoseconds,
}

impl TimeUnit {
    pub const fn seconds_per_unit(self) -> f64 {
        match self {
            TimeUnit::Seconds => 1.0,
            TimeUnit::Milliseconds => 1e-3,
            TimeUnit::Microseconds => 1e-6,
            TimeUnit::Nanoseconds => 1e-9,
        }
    }

    pub fn from_seconds(self, seconds: f64) -> f64 {
        seconds / self.seconds_per_unit()
    }
}

/// Clock source constant for a ladder divider, as named by the vendor HAL
pub fn clock_source_name(divider: u32) -> String {
    format!("SYSCLKDIV{divider}")
}

/// Period register value for `source_hz / divider` counting towards `target_hz`.
///
/// Unclamped: may be negative or exceed [`PERIOD_MAX`].
fn raw_period(timer_hz: f64, target_hz: f64) -> f64 {
    (timer_hz / target_hz).round() - 1.0
}

/// One ladder step evaluated against a target frequency
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LadderCandidate {
    pub divider: u32,
    pub timer_frequency_hz: f64,
    /// `round(timer / target) - 1`, before any clamping
    pub raw_period: f64,
    /// Whether `raw_period` fits `0..=PERIOD_MAX`
    pub fits: bool,
}

impl LadderCandidate {
    /// Frequency this step would produce with its own period, if it fits.
    pub fn achieved_frequency_hz(&self) -> Option<f64> {
        self.fits
            .then(|| self.timer_frequency_hz / (self.raw_period + 1.0))
    }
}

/// Evaluates every ladder divider, in ladder order.
///
/// # Errors
///
/// Returns [`Error::InvalidParameter`](crate::Error::InvalidParameter) for a
/// non-positive or non-finite frequency.
pub fn evaluate_ladder(source_hz: f64, target_hz: f64) -> Result<Vec<LadderCandidate>> {
    let source_hz = validate_frequency("source frequency", source_hz)?;
    let target_hz = validate_frequency("target frequency", target_hz)?;

    Ok(DIVIDER_LADDER
        .iter()
        .map(|&divider| {
            let timer_frequency_hz = source_hz / f64::from(divider);
            let raw_period = raw_period(timer_frequency_hz, target_hz);
            LadderCandidate {
                divider,
                timer_frequency_hz,
                raw_period,
                fits: (0.0..=f64::from(PERIOD_MAX)).contains(&raw_period),
            }
        })
        .collect())
}

/// Period register value plus the flags describing any clamping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ClampedPeriod {
    period: u16,
    overflowed: bool,
    underflowed: bool,
}

fn clamp_period(raw: f64) -> ClampedPeriod {
    if raw > f64::from(PERIOD_MAX) {
        ClampedPeriod {
            period: PERIOD_MAX,
            overflowed: true,
            underflowed: false,
        }
    } else if raw < 0.0 {
        ClampedPeriod {
            period: 0,
            overflowed: false,
            underflowed: true,
        }
    } else {
        ClampedPeriod {
            period: raw as u16,
            overflowed: false,
            underflowed: false,
        }
    }
}

/// PWM timer configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimerSolution {
    pub divider: u32,
    /// `SYSCLKDIV<n>` constant for `divider`
    pub clock_source: String,
    pub period: u16,
    /// Compare value, always `<= period`
    pub duty: u16,
    pub duty_percent: f64,
    pub source_frequency_hz: f64,
    pub target_frequency_hz: f64,
    pub achieved_frequency_hz: f64,
    /// Even the largest divider needs a period above [`PERIOD_MAX`]; the
    /// period was clamped and the achieved frequency is above the target.
    pub overflowed: bool,
    /// The target is faster than the undivided clock can produce; the
    /// period was clamped to 0.
    pub underflowed: bool,
}

impl TimerSolution {
    /// Relative deviation of the achieved frequency from the target, in percent.
    pub fn error_percent(&self) -> f64 {
        (self.achieved_frequency_hz - self.target_frequency_hz) / self.target_frequency_hz * 100.0
    }
}

/// Chooses divider, period and duty registers for a PWM output.
///
/// The first ladder divider whose period fits `0..=65535` wins. If every
/// divider overflows, the largest one is used with the period clamped to
/// 65535 and `overflowed` set. This is a warning, not a failure.
///
/// # Errors
///
/// Returns [`Error::InvalidParameter`](crate::Error::InvalidParameter) for a
/// non-positive frequency or a duty cycle outside `[0, 100]`.
pub fn solve(source_hz: f64, target_hz: f64, duty_percent: f64) -> Result<TimerSolution> {
    let duty_percent = validate_duty_percent(duty_percent)?;
    let ladder = evaluate_ladder(source_hz, target_hz)?;

    let chosen = match ladder.iter().find(|c| c.fits) {
        Some(candidate) => candidate,
        // Periods shrink as the divider grows: either all overflow (largest
        // divider is closest) or all underflow (divider 1 is closest).
        None if ladder.iter().all(|c| c.raw_period > f64::from(PERIOD_MAX)) => &ladder[ladder.len() - 1],
        None => &ladder[0],
    };

    let clamped = clamp_period(chosen.raw_period);
    let achieved_frequency_hz = chosen.timer_frequency_hz / (f64::from(clamped.period) + 1.0);
    let duty = (f64::from(clamped.period) * duty_percent / 100.0).round() as u16;

    if clamped.overflowed {
        tracing::warn!(
            "Period overflows 16 bits even at divider {}: clamped to {}, output {:.3} Hz instead of {} Hz",
            chosen.divider,
            PERIOD_MAX,
            achieved_frequency_hz,
            target_hz
        );
    } else if clamped.underflowed {
        tracing::warn!(
            "Target {} Hz exceeds what a {} Hz clock can produce; period clamped to 0",
            target_hz,
            source_hz
        );
    } else {
        tracing::debug!(
            "Divider {} gives period {} ({:.3} Hz)",
            chosen.divider,
            clamped.period,
            achieved_frequency_hz
        );
    }

    Ok(TimerSolution {
        divider: chosen.divider,
        clock_source: clock_source_name(chosen.divider),
        period: clamped.period,
        duty,
        duty_percent,
        source_frequency_hz: source_hz,
        target_frequency_hz: target_hz,
        achieved_frequency_hz,
        overflowed: clamped.overflowed,
        underflowed: clamped.underflowed,
    })
}

/// Period register and timing for an explicitly chosen divider
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixedTiming {
    pub divider: f64,
    pub period: u16,
    pub achieved_frequency_hz: f64,
    /// `1 / achieved_frequency_hz`, in `time_unit`
    pub period_time: f64,
    pub time_unit: TimeUnit,
    pub overflowed: bool,
    pub underflowed: bool,
}

/// Computes the period register for a fixed divider, without any search.
///
/// # Errors
///
/// Returns [`Error::InvalidParameter`](crate::Error::InvalidParameter) for a
/// non-positive frequency or divider.
pub fn solve_fixed(
    source_hz: f64,
    target_hz: f64,
    divider: f64,
    time_unit: TimeUnit,
) -> Result<FixedTiming> {
    let source_hz = validate_frequency("source frequency", source_hz)?;
    let target_hz = validate_frequency("target frequency", target_hz)?;
    let divider = validate_divider(divider)?;

    let timer_hz = source_hz / divider;
    let clamped = clamp_period(raw_period(timer_hz, target_hz));
    let achieved_frequency_hz = timer_hz / (f64::from(clamped.period) + 1.0);

    Ok(FixedTiming {
        divider,
        period: clamped.period,
        achieved_frequency_hz,
        period_time: time_unit.from_seconds(1.0 / achieved_frequency_hz),
        time_unit,
        overflowed: clamped.overflowed,
        underflowed: clamped.underflowed,
    })
}

/// Output of a plain clock divider
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClockDivision {
    pub source_frequency_hz: f64,
    pub divider: f64,
    pub frequency_hz: f64,
    /// One clock period in `time_unit`
    pub period_time: f64,
    pub time_unit: TimeUnit,
}

/// Divides a clock and reports the resulting frequency and period.
///
/// # Errors
///
/// Returns [`Error::InvalidParameter`](crate::Error::InvalidParameter) for a
/// non-positive frequency or divider.
///
/// # Examples
///
/// ```
/// use mcucalc::core::timer::{divide_clock, TimeUnit};
///
/// let tick = divide_clock(72e6, 7200.0, TimeUnit::Microseconds).unwrap();
/// assert_eq!(tick.frequency_hz, 10_000.0);
/// assert!((tick.period_time - 100.0).abs() < 1e-9);
/// ```
pub fn divide_clock(source_hz: f64, divider: f64, time_unit: TimeUnit) -> Result<ClockDivision> {
    let source_hz = validate_frequency("source frequency", source_hz)?;
    let divider = validate_divider(divider)?;
    let frequency_hz = source_hz / divider;

    Ok(ClockDivision {
        source_frequency_hz: source_hz,
        divider,
        frequency_hz,
        period_time: time_unit.from_seconds(1.0 / frequency_hz),
        time_unit,
    })
}

/// Formats a frequency with the largest unit that keeps it at or above 1,
/// rounded to 6 decimals with trailing zeros removed.
///
/// # Examples
///
/// ```
/// use mcucalc::core::timer::format_frequency;
///
/// assert_eq!(format_frequency(24_000_000.0), "24 MHz");
/// assert_eq!(format_frequency(1_000.5), "1.0005 kHz");
/// assert_eq!(format_frequency(366.21), "366.21 Hz");
/// ```
pub fn format_frequency(hz: f64) -> String {
    let unit = [FrequencyUnit::GHz, FrequencyUnit::MHz, FrequencyUnit::KHz]
        .into_iter()
        .find(|u| hz >= u.hz_per_unit())
        .unwrap_or(FrequencyUnit::Hz);

    let scaled = format!("{:.6}", hz / unit.hz_per_unit());
    let trimmed = scaled.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {unit}")
}

/// Generates C initialization code for PWM channel A of PWM0 using the
/// computed registers.
pub fn pwm_init_snippet(solution: &TimerSolution) -> String {
    let percent = if solution.period == 0 {
        0
    } else {
        (f64::from(solution.duty) * 100.0 / f64::from(solution.period)).round() as u32
    };

    let mut code = String::new();
    let _ = writeln!(code, "void PWMInit(void)");
    let _ = writeln!(code, "{{");
    let _ = writeln!(code, "    PWM_InitTypeDef PWM_InitStructure;");
    let _ = writeln!(code, "    GPIO_InitTypeDef GPIO_InitStructure;");
    let _ = writeln!(code);
    let _ = writeln!(code, "    RCC_APB0PeriphClockOnOff(RCC_APB0_PWM0, SH_ON);");
    let _ = writeln!(code, "    RCC_AHBPeriphClockOnOff(RCC_AHB_IOCLK, SH_ON);");
    let _ = writeln!(code);
    let _ = writeln!(code, "    GPIO_InitStructure.GPIO_Pin = GPIO_Pin_3;");
    let _ = writeln!(code, "    GPIO_InitStructure.GPIO_Mode = GPIO_Mode_OUT;");
    let _ = writeln!(code, "    GPIO_InitStructure.GPIO_ODrv = GPIO_ODrv_NORMAL;");
    let _ = writeln!(code, "    GPIO_InitStructure.GPIO_OType = GPIO_OType_PP;");
    let _ = writeln!(code, "    GPIO_InitStructure.GPIO_PuPd = GPIO_PuPd_NOPULL;");
    let _ = writeln!(code, "    GPIO_Init(GPIOA, &GPIO_InitStructure);");
    let _ = writeln!(code);
    let _ = writeln!(code, "    GPIO_PinAFConfig(GPIOA, GPIO_Pin_3, GPIO_AF_PWM0);");
    let _ = writeln!(code);
    let _ = writeln!(code, "    PWM_InitStructure.PWM_Period = {};", solution.period);
    let _ = writeln!(
        code,
        "    PWM_InitStructure.PWM_Duty = {}; // {percent}%",
        solution.duty
    );
    let _ = writeln!(code, "    PWM_InitStructure.PWM_DeadBand = 1;");
    let _ = writeln!(
        code,
        "    PWM_InitStructure.PWM_CLKSource = {};",
        solution.clock_source
    );
    let _ = writeln!(code);
    let _ = writeln!(code, "    PWM_Init(PWM0, &PWM_InitStructure);");
    let _ = writeln!(code, "    PWM_OutPutEnable(PWM0, PWM_CHANNEL_A, SH_ENABLE);");
    let _ = writeln!(code, "    PWM_OnOff(PWM0, SH_ON);");
    let _ = writeln!(code, "}}");
    code
}
