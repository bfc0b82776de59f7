//! Concrete strategy families and their parameter tuples.

pub mod big_will;
pub mod buy_and_hold;
pub mod double_ema;
pub mod double_ema_stoch_rsi;
pub mod ema3_stoch_rsi_atr;
pub mod supertrend_ema_atr;
pub mod trix_stoch_rsi;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::error::SweepError;
use crate::domain::indicator::IndicatorType;
use crate::domain::strategy::Strategy;

pub use big_will::BigWill;
pub use buy_and_hold::BuyAndHold;
pub use double_ema::DoubleEma;
pub use double_ema_stoch_rsi::DoubleEmaStochRsi;
pub use ema3_stoch_rsi_atr::Ema3StochRsiAtr;
pub use supertrend_ema_atr::SuperTrendEmaAtr;
pub use trix_stoch_rsi::TrixStochRsi;

/// Whether a parameter is a bar count or a real-valued threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Period,
    Real,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyFamily {
    BuyAndHold,
    DoubleEma,
    DoubleEmaStochRsi,
    Ema3StochRsiAtr,
    TrixStochRsi,
    SuperTrendEmaAtr,
    BigWill,
}

impl StrategyFamily {
    pub const ALL: [StrategyFamily; 7] = [
        StrategyFamily::BuyAndHold,
        StrategyFamily::DoubleEma,
        StrategyFamily::DoubleEmaStochRsi,
        StrategyFamily::Ema3StochRsiAtr,
        StrategyFamily::TrixStochRsi,
        StrategyFamily::SuperTrendEmaAtr,
        StrategyFamily::BigWill,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyFamily::BuyAndHold => "buy_and_hold",
            StrategyFamily::DoubleEma => "double_ema",
            StrategyFamily::DoubleEmaStochRsi => "double_ema_stoch_rsi",
            StrategyFamily::Ema3StochRsiAtr => "ema3_stoch_rsi_atr",
            StrategyFamily::TrixStochRsi => "trix_stoch_rsi",
            StrategyFamily::SuperTrendEmaAtr => "supertrend_ema_atr",
            StrategyFamily::BigWill => "big_will",
        }
    }

    /// Every configurable parameter of the family, in grid order.
    pub fn parameters(&self) -> &'static [(&'static str, ParamKind)] {
        use ParamKind::{Period, Real};
        match self {
            StrategyFamily::BuyAndHold => &[],
            StrategyFamily::DoubleEma => &[("ema_fast", Period), ("ema_slow", Period)],
            StrategyFamily::DoubleEmaStochRsi => &[
                ("ema_fast", Period),
                ("ema_slow", Period),
                ("stoch_window", Period),
                ("rsi_period", Period),
                ("overbought", Real),
                ("oversold", Real),
            ],
            StrategyFamily::Ema3StochRsiAtr => &[
                ("ema_fast", Period),
                ("ema_mid", Period),
                ("ema_slow", Period),
                ("atr_period", Period),
                ("up_atr", Real),
                ("down_atr", Real),
                ("stoch_rsi_period", Period),
                ("stoch_period", Period),
                ("k_smooth", Period),
                ("d_smooth", Period),
                ("oversold", Real),
                ("timeout_hours", Period),
                ("take_profit_pct", Real),
            ],
            StrategyFamily::TrixStochRsi => &[
                ("ema", Period),
                ("trix_length", Period),
                ("trix_signal", Period),
                ("stoch_window", Period),
                ("rsi_period", Period),
                ("overbought", Real),
                ("oversold", Real),
            ],
            StrategyFamily::SuperTrendEmaAtr => &[
                ("ema", Period),
                ("atr_period", Period),
                ("supertrend_atr_period", Period),
                ("supertrend_multiplier", Real),
                ("stop_atr", Real),
                ("target_atr", Real),
            ],
            StrategyFamily::BigWill => &[
                ("ao_fast", Period),
                ("ao_slow", Period),
                ("ema_fast", Period),
                ("ema_slow", Period),
                ("willr_period", Period),
                ("willr_oversold", Real),
                ("willr_overbought", Real),
                ("stoch_window", Period),
                ("rsi_period", Period),
                ("stoch_oversold", Real),
                ("take_profit_pct", Real),
            ],
        }
    }
}

impl fmt::Display for StrategyFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyFamily {
    type Err = SweepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        StrategyFamily::ALL
            .into_iter()
            .find(|family| family.as_str() == name)
            .ok_or(SweepError::UnknownStrategy { name })
    }
}

/// One parameter tuple of one strategy family.
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyParams {
    BuyAndHold(BuyAndHold),
    DoubleEma(DoubleEma),
    DoubleEmaStochRsi(DoubleEmaStochRsi),
    Ema3StochRsiAtr(Ema3StochRsiAtr),
    TrixStochRsi(TrixStochRsi),
    SuperTrendEmaAtr(SuperTrendEmaAtr),
    BigWill(BigWill),
}

impl StrategyParams {
    /// Default tuple of `family` with the named `values` overriding its fields.
    ///
    /// Period values are truncated to whole bars; unknown names are ignored.
    pub fn with_values(family: StrategyFamily, values: &HashMap<String, f64>) -> Self {
        let real = |name: &str, default: f64| values.get(name).copied().unwrap_or(default);
        let period = |name: &str, default: usize| {
            values
                .get(name)
                .map(|&v| v.max(0.0) as usize)
                .unwrap_or(default)
        };

        match family {
            StrategyFamily::BuyAndHold => StrategyParams::BuyAndHold(BuyAndHold),
            StrategyFamily::DoubleEma => {
                let d = DoubleEma::default();
                StrategyParams::DoubleEma(DoubleEma {
                    ema_fast: period("ema_fast", d.ema_fast),
                    ema_slow: period("ema_slow", d.ema_slow),
                })
            }
            StrategyFamily::DoubleEmaStochRsi => {
                let d = DoubleEmaStochRsi::default();
                StrategyParams::DoubleEmaStochRsi(DoubleEmaStochRsi {
                    ema_fast: period("ema_fast", d.ema_fast),
                    ema_slow: period("ema_slow", d.ema_slow),
                    stoch_window: period("stoch_window", d.stoch_window),
                    rsi_period: period("rsi_period", d.rsi_period),
                    overbought: real("overbought", d.overbought),
                    oversold: real("oversold", d.oversold),
                })
            }
            StrategyFamily::Ema3StochRsiAtr => {
                let d = Ema3StochRsiAtr::default();
                StrategyParams::Ema3StochRsiAtr(Ema3StochRsiAtr {
                    ema_fast: period("ema_fast", d.ema_fast),
                    ema_mid: period("ema_mid", d.ema_mid),
                    ema_slow: period("ema_slow", d.ema_slow),
                    atr_period: period("atr_period", d.atr_period),
                    up_atr: real("up_atr", d.up_atr),
                    down_atr: real("down_atr", d.down_atr),
                    stoch_rsi_period: period("stoch_rsi_period", d.stoch_rsi_period),
                    stoch_period: period("stoch_period", d.stoch_period),
                    k_smooth: period("k_smooth", d.k_smooth),
                    d_smooth: period("d_smooth", d.d_smooth),
                    oversold: real("oversold", d.oversold),
                    timeout_hours: period("timeout_hours", d.timeout_hours as usize) as i64,
                    take_profit_pct: real("take_profit_pct", d.take_profit_pct),
                })
            }
            StrategyFamily::TrixStochRsi => {
                let d = TrixStochRsi::default();
                StrategyParams::TrixStochRsi(TrixStochRsi {
                    ema: period("ema", d.ema),
                    trix_length: period("trix_length", d.trix_length),
                    trix_signal: period("trix_signal", d.trix_signal),
                    stoch_window: period("stoch_window", d.stoch_window),
                    rsi_period: period("rsi_period", d.rsi_period),
                    overbought: real("overbought", d.overbought),
                    oversold: real("oversold", d.oversold),
                })
            }
            StrategyFamily::SuperTrendEmaAtr => {
                let d = SuperTrendEmaAtr::default();
                StrategyParams::SuperTrendEmaAtr(SuperTrendEmaAtr {
                    ema: period("ema", d.ema),
                    atr_period: period("atr_period", d.atr_period),
                    supertrend_atr_period: period("supertrend_atr_period", d.supertrend_atr_period),
                    supertrend_multiplier: real("supertrend_multiplier", d.supertrend_multiplier),
                    stop_atr: real("stop_atr", d.stop_atr),
                    target_atr: real("target_atr", d.target_atr),
                })
            }
            StrategyFamily::BigWill => {
                let d = BigWill::default();
                StrategyParams::BigWill(BigWill {
                    ao_fast: period("ao_fast", d.ao_fast),
                    ao_slow: period("ao_slow", d.ao_slow),
                    ema_fast: period("ema_fast", d.ema_fast),
                    ema_slow: period("ema_slow", d.ema_slow),
                    willr_period: period("willr_period", d.willr_period),
                    willr_oversold: real("willr_oversold", d.willr_oversold),
                    willr_overbought: real("willr_overbought", d.willr_overbought),
                    stoch_window: period("stoch_window", d.stoch_window),
                    rsi_period: period("rsi_period", d.rsi_period),
                    stoch_oversold: real("stoch_oversold", d.stoch_oversold),
                    take_profit_pct: real("take_profit_pct", d.take_profit_pct),
                })
            }
        }
    }

    pub fn family(&self) -> StrategyFamily {
        match self {
            StrategyParams::BuyAndHold(_) => StrategyFamily::BuyAndHold,
            StrategyParams::DoubleEma(_) => StrategyFamily::DoubleEma,
            StrategyParams::DoubleEmaStochRsi(_) => StrategyFamily::DoubleEmaStochRsi,
            StrategyParams::Ema3StochRsiAtr(_) => StrategyFamily::Ema3StochRsiAtr,
            StrategyParams::TrixStochRsi(_) => StrategyFamily::TrixStochRsi,
            StrategyParams::SuperTrendEmaAtr(_) => StrategyFamily::SuperTrendEmaAtr,
            StrategyParams::BigWill(_) => StrategyFamily::BigWill,
        }
    }

    pub fn as_strategy(&self) -> &dyn Strategy {
        match self {
            StrategyParams::BuyAndHold(s) => s,
            StrategyParams::DoubleEma(s) => s,
            StrategyParams::DoubleEmaStochRsi(s) => s,
            StrategyParams::Ema3StochRsiAtr(s) => s,
            StrategyParams::TrixStochRsi(s) => s,
            StrategyParams::SuperTrendEmaAtr(s) => s,
            StrategyParams::BigWill(s) => s,
        }
    }

    /// Every parameter with its value, in [`StrategyFamily::parameters`] order.
    ///
    /// Feeding these back through [`StrategyParams::with_values`] rebuilds the tuple.
    pub fn fields(&self) -> Vec<(&'static str, f64)> {
        match self {
            StrategyParams::BuyAndHold(_) => Vec::new(),
            StrategyParams::DoubleEma(s) => vec![
                ("ema_fast", s.ema_fast as f64),
                ("ema_slow", s.ema_slow as f64),
            ],
            StrategyParams::DoubleEmaStochRsi(s) => vec![
                ("ema_fast", s.ema_fast as f64),
                ("ema_slow", s.ema_slow as f64),
                ("stoch_window", s.stoch_window as f64),
                ("rsi_period", s.rsi_period as f64),
                ("overbought", s.overbought),
                ("oversold", s.oversold),
            ],
            StrategyParams::Ema3StochRsiAtr(s) => vec![
                ("ema_fast", s.ema_fast as f64),
                ("ema_mid", s.ema_mid as f64),
                ("ema_slow", s.ema_slow as f64),
                ("atr_period", s.atr_period as f64),
                ("up_atr", s.up_atr),
                ("down_atr", s.down_atr),
                ("stoch_rsi_period", s.stoch_rsi_period as f64),
                ("stoch_period", s.stoch_period as f64),
                ("k_smooth", s.k_smooth as f64),
                ("d_smooth", s.d_smooth as f64),
                ("oversold", s.oversold),
                ("timeout_hours", s.timeout_hours as f64),
                ("take_profit_pct", s.take_profit_pct),
            ],
            StrategyParams::TrixStochRsi(s) => vec![
                ("ema", s.ema as f64),
                ("trix_length", s.trix_length as f64),
                ("trix_signal", s.trix_signal as f64),
                ("stoch_window", s.stoch_window as f64),
                ("rsi_period", s.rsi_period as f64),
                ("overbought", s.overbought),
                ("oversold", s.oversold),
            ],
            StrategyParams::SuperTrendEmaAtr(s) => vec![
                ("ema", s.ema as f64),
                ("atr_period", s.atr_period as f64),
                ("supertrend_atr_period", s.supertrend_atr_period as f64),
                ("supertrend_multiplier", s.supertrend_multiplier),
                ("stop_atr", s.stop_atr),
                ("target_atr", s.target_atr),
            ],
            StrategyParams::BigWill(s) => vec![
                ("ao_fast", s.ao_fast as f64),
                ("ao_slow", s.ao_slow as f64),
                ("ema_fast", s.ema_fast as f64),
                ("ema_slow", s.ema_slow as f64),
                ("willr_period", s.willr_period as f64),
                ("willr_oversold", s.willr_oversold),
                ("willr_overbought", s.willr_overbought),
                ("stoch_window", s.stoch_window as f64),
                ("rsi_period", s.rsi_period as f64),
                ("stoch_oversold", s.stoch_oversold),
                ("take_profit_pct", s.take_profit_pct),
            ],
        }
    }

    /// Tuples that cannot describe a meaningful rule set are skipped by the sweep.
    pub fn is_valid(&self) -> bool {
        let periods_positive = self
            .as_strategy()
            .required_indicators()
            .iter()
            .all(|kind| !has_zero_period(kind));
        periods_positive
            && match self {
                StrategyParams::BuyAndHold(_) => true,
                StrategyParams::DoubleEma(s) => s.ema_fast < s.ema_slow,
                StrategyParams::DoubleEmaStochRsi(s) => {
                    s.ema_fast < s.ema_slow && s.oversold < s.overbought
                }
                StrategyParams::Ema3StochRsiAtr(s) => {
                    s.ema_fast < s.ema_mid && s.ema_mid < s.ema_slow
                }
                StrategyParams::TrixStochRsi(s) => s.oversold < s.overbought,
                StrategyParams::SuperTrendEmaAtr(s) => {
                    IndicatorType::supertrend_multiplier_is_exact(s.supertrend_multiplier)
                }
                StrategyParams::BigWill(s) => s.ao_fast != s.ao_slow && s.ema_fast <= s.ema_slow,
            }
    }

    /// Most bars any required indicator needs before its first valid point.
    pub fn lookback(&self) -> usize {
        self.as_strategy()
            .required_indicators()
            .iter()
            .map(|kind| kind.min_bars())
            .max()
            .unwrap_or(0)
    }
}

fn has_zero_period(kind: &IndicatorType) -> bool {
    match *kind {
        IndicatorType::Sma(p)
        | IndicatorType::Ema(p)
        | IndicatorType::Rsi(p)
        | IndicatorType::Atr(p)
        | IndicatorType::WilliamsR(p) => p == 0,
        IndicatorType::StochRsi {
            stoch_window,
            rsi_period,
        } => stoch_window == 0 || rsi_period == 0,
        IndicatorType::StochRsiK {
            rsi_period,
            stoch_period,
            k_smooth,
            d_smooth,
        }
        | IndicatorType::StochRsiD {
            rsi_period,
            stoch_period,
            k_smooth,
            d_smooth,
        } => rsi_period == 0 || stoch_period == 0 || k_smooth == 0 || d_smooth == 0,
        IndicatorType::Trix { length, signal } => length == 0 || signal == 0,
        IndicatorType::Awesome { fast, slow } => fast == 0 || slow == 0,
        IndicatorType::SuperTrend { atr_period, .. } => atr_period == 0,
    }
}

impl fmt::Display for StrategyParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.family())?;
        let fields = self.fields();
        if !fields.is_empty() {
            let rendered: Vec<String> = fields.iter().map(|(k, v)| format!("{k}={v}")).collect();
            write!(f, "({})", rendered.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_round_trips_through_name() {
        for family in StrategyFamily::ALL {
            assert_eq!(family.as_str().parse::<StrategyFamily>().unwrap(), family);
        }
    }

    #[test]
    fn family_parse_is_case_insensitive() {
        assert_eq!(
            " Big_Will ".parse::<StrategyFamily>().unwrap(),
            StrategyFamily::BigWill
        );
    }

    #[test]
    fn unknown_family() {
        let err = "martingale".parse::<StrategyFamily>().unwrap_err();
        assert!(matches!(err, SweepError::UnknownStrategy { name } if name == "martingale"));
    }

    #[test]
    fn display_lists_fields() {
        let params = StrategyParams::DoubleEma(DoubleEma {
            ema_fast: 5,
            ema_slow: 34,
        });
        assert_eq!(params.to_string(), "double_ema(ema_fast=5, ema_slow=34)");
        assert_eq!(
            StrategyParams::BuyAndHold(BuyAndHold).to_string(),
            "buy_and_hold"
        );
    }

    #[test]
    fn display_names_every_parameter() {
        let params = StrategyParams::BigWill(BigWill {
            willr_period: 21,
            take_profit_pct: 7.5,
            ..BigWill::default()
        });
        let text = params.to_string();
        assert!(text.contains("willr_period=21"), "{text}");
        assert!(text.contains("take_profit_pct=7.5"), "{text}");
    }

    #[test]
    fn fields_follow_parameter_order() {
        for family in StrategyFamily::ALL {
            let params = StrategyParams::with_values(family, &HashMap::new());
            let names: Vec<&str> = params.fields().iter().map(|(name, _)| *name).collect();
            let expected: Vec<&str> = family.parameters().iter().map(|(name, _)| *name).collect();
            assert_eq!(names, expected, "{family}");
        }
    }

    #[test]
    fn fields_rebuild_the_tuple() {
        let tuples = [
            StrategyParams::BigWill(BigWill {
                ao_fast: 3,
                willr_period: 21,
                take_profit_pct: 7.5,
                ..BigWill::default()
            }),
            StrategyParams::Ema3StochRsiAtr(Ema3StochRsiAtr {
                atr_period: 9,
                timeout_hours: 72,
                oversold: 0.15,
                ..Ema3StochRsiAtr::default()
            }),
            StrategyParams::TrixStochRsi(TrixStochRsi {
                stoch_window: 10,
                overbought: 0.75,
                ..TrixStochRsi::default()
            }),
            StrategyParams::SuperTrendEmaAtr(SuperTrendEmaAtr {
                atr_period: 21,
                supertrend_multiplier: 2.35,
                target_atr: 6.5,
                ..SuperTrendEmaAtr::default()
            }),
            StrategyParams::DoubleEma(DoubleEma {
                ema_fast: 7,
                ema_slow: 30,
            }),
            StrategyParams::DoubleEmaStochRsi(DoubleEmaStochRsi {
                rsi_period: 9,
                oversold: 0.1,
                ..DoubleEmaStochRsi::default()
            }),
        ];
        for params in tuples {
            let values: HashMap<String, f64> = params
                .fields()
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect();
            assert_eq!(StrategyParams::with_values(params.family(), &values), params);
        }
    }

    #[test]
    fn supertrend_multiplier_off_the_key_grid_is_invalid() {
        for (multiplier, valid) in [(2.35, true), (2.345, false), (0.004, false)] {
            let params = StrategyParams::SuperTrendEmaAtr(SuperTrendEmaAtr {
                supertrend_multiplier: multiplier,
                ..SuperTrendEmaAtr::default()
            });
            assert_eq!(params.is_valid(), valid, "multiplier {multiplier}");
        }
    }

    #[test]
    fn double_ema_needs_fast_below_slow() {
        assert!(StrategyParams::DoubleEma(DoubleEma::default()).is_valid());
        let equal = StrategyParams::DoubleEma(DoubleEma {
            ema_fast: 30,
            ema_slow: 30,
        });
        assert!(!equal.is_valid());
        let inverted = StrategyParams::DoubleEmaStochRsi(DoubleEmaStochRsi {
            ema_fast: 120,
            ..DoubleEmaStochRsi::default()
        });
        assert!(!inverted.is_valid());
    }

    #[test]
    fn ema_triple_must_increase() {
        let valid = StrategyParams::Ema3StochRsiAtr(Ema3StochRsiAtr::default());
        assert!(valid.is_valid());
        let invalid = StrategyParams::Ema3StochRsiAtr(Ema3StochRsiAtr {
            ema_fast: 50,
            ema_mid: 20,
            ..Ema3StochRsiAtr::default()
        });
        assert!(!invalid.is_valid());
    }

    #[test]
    fn with_values_overrides_defaults() {
        let values = HashMap::from([
            ("ema".to_string(), 60.0),
            ("supertrend_multiplier".to_string(), 2.5),
            ("unrelated".to_string(), 1.0),
        ]);
        let params = StrategyParams::with_values(StrategyFamily::SuperTrendEmaAtr, &values);
        assert_eq!(
            params,
            StrategyParams::SuperTrendEmaAtr(SuperTrendEmaAtr {
                ema: 60,
                supertrend_multiplier: 2.5,
                ..SuperTrendEmaAtr::default()
            })
        );
    }

    #[test]
    fn zero_period_is_invalid() {
        let params = StrategyParams::TrixStochRsi(TrixStochRsi {
            trix_signal: 0,
            ..TrixStochRsi::default()
        });
        assert!(!params.is_valid());
        assert!(StrategyParams::TrixStochRsi(TrixStochRsi::default()).is_valid());
    }

    #[test]
    fn equal_ao_periods_are_invalid() {
        let params = StrategyParams::BigWill(BigWill {
            ao_fast: 20,
            ao_slow: 20,
            ..BigWill::default()
        });
        assert!(!params.is_valid());
    }

    #[test]
    fn every_parameter_name_is_read() {
        for family in StrategyFamily::ALL {
            let defaults = StrategyParams::with_values(family, &HashMap::new());
            for &(name, kind) in family.parameters() {
                let bumped = match kind {
                    ParamKind::Period => 7.0,
                    ParamKind::Real => 0.123,
                };
                let values = HashMap::from([(name.to_string(), bumped)]);
                assert_ne!(
                    StrategyParams::with_values(family, &values),
                    defaults,
                    "{family}: {name} ignored"
                );
            }
        }
    }

    #[test]
    fn lookback_is_longest_indicator() {
        let params = StrategyParams::BigWill(BigWill::default());
        // EMA(200) dominates
        assert_eq!(params.lookback(), 200);
    }
}
