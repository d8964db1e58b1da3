//! Strategy sleeves — named sub-strategies with their own candidate
//! universe, risk-budget share, and feature weighting.
//!
//! The registry is an explicit, immutable lookup built once and passed by
//! reference into every caller that needs sleeve resolution. No globals.

use std::collections::BTreeMap;

use thiserror::Error;

/// Pure universe builder: basket name -> eligible tickers.
pub type UniverseFn = fn(&str) -> Vec<String>;

/// One sleeve's immutable configuration.
#[derive(Debug, Clone)]
pub struct SleeveConfig {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    /// Share of total deployable capital this sleeve plans against. Shares
    /// across sleeves need not sum to 1.0; callers decide normalization.
    pub risk_budget_pct: f64,
    pub universe_fn: UniverseFn,
    /// Feature-prefix multipliers applied by the external scoring stage.
    /// None means the shared matrix is used as-is.
    pub feature_weights_by_prefix: Option<BTreeMap<&'static str, f64>>,
}

impl SleeveConfig {
    /// Tickers eligible for this sleeve under a basket name.
    pub fn universe(&self, basket: &str) -> Vec<String> {
        (self.universe_fn)(basket)
    }

    /// Multiplier for one feature column: longest declared prefix match
    /// wins, unweighted features get 1.0.
    pub fn weight_for_feature(&self, feature: &str) -> f64 {
        let Some(weights) = &self.feature_weights_by_prefix else {
            return 1.0;
        };
        let mut best: Option<(&str, f64)> = None;
        for (&prefix, &w) in weights {
            if feature.starts_with(prefix) {
                match best {
                    Some((b, _)) if b.len() >= prefix.len() => {}
                    _ => best = Some((prefix, w)),
                }
            }
        }
        best.map_or(1.0, |(_, w)| w)
    }
}

/// Unknown sleeve names are configuration mistakes and fail immediately.
#[derive(Debug, Error)]
pub enum SleeveError {
    #[error("unknown sleeve {name:?}; known: {known:?}")]
    Unknown { name: String, known: Vec<String> },
}

/// Immutable name/alias -> sleeve lookup, case-insensitive.
pub struct SleeveRegistry {
    sleeves: Vec<SleeveConfig>,
    index: BTreeMap<String, usize>,
}

impl SleeveRegistry {
    /// The canonical sleeve definitions.
    pub fn builtin() -> Self {
        Self::from_sleeves(vec![
            SleeveConfig {
                name: "macro",
                aliases: &["core"],
                risk_budget_pct: 0.60,
                universe_fn: macro_universe,
                // Macro uses the shared matrix as-is.
                feature_weights_by_prefix: None,
            },
            SleeveConfig {
                name: "vol",
                aliases: &["volatility"],
                risk_budget_pct: 0.25,
                universe_fn: vol_universe,
                feature_weights_by_prefix: Some(BTreeMap::from([
                    ("vol_", 2.0),
                    ("vol_pressure_score", 3.0),
                    ("rates_", 1.25),
                    ("usd_", 0.75),
                    ("funding_", 1.0),
                ])),
            },
            SleeveConfig {
                name: "ai-bubble",
                aliases: &["ai_bubble", "tech_duration"],
                risk_budget_pct: 0.15,
                universe_fn: ai_bubble_universe,
                feature_weights_by_prefix: Some(BTreeMap::from([
                    ("rates_", 2.0),
                    ("macro_disconnect_score", 1.5),
                    ("usd_", 0.8),
                    ("vol_", 1.0),
                ])),
            },
            SleeveConfig {
                name: "housing",
                aliases: &["mbs", "mortgage"],
                risk_budget_pct: 0.20,
                universe_fn: housing_universe,
                feature_weights_by_prefix: Some(BTreeMap::from([
                    ("housing_", 3.0),
                    ("rates_", 1.5),
                    ("funding_", 1.0),
                    ("usd_", 0.5),
                ])),
            },
        ])
    }

    fn from_sleeves(sleeves: Vec<SleeveConfig>) -> Self {
        let mut index = BTreeMap::new();
        for (i, s) in sleeves.iter().enumerate() {
            index.insert(s.name.to_lowercase(), i);
            for alias in s.aliases {
                index.insert(alias.to_lowercase(), i);
            }
        }
        Self { sleeves, index }
    }

    /// Look up one sleeve by name or alias, case-insensitive.
    pub fn get(&self, name: &str) -> Option<&SleeveConfig> {
        self.index
            .get(&name.trim().to_lowercase())
            .map(|&i| &self.sleeves[i])
    }

    /// All canonical sleeves, declaration order.
    pub fn sleeves(&self) -> &[SleeveConfig] {
        &self.sleeves
    }

    /// Every accepted key (names and aliases), sorted.
    pub fn known_keys(&self) -> Vec<String> {
        self.index.keys().cloned().collect()
    }

    /// Resolve a list of requested sleeve names.
    ///
    /// Empty input defaults to `["macro"]`. Unknown names fail naming the
    /// offender and listing all known keys. Aliased duplicates are
    /// deduplicated preserving first-seen order.
    pub fn resolve(&self, names: &[String]) -> Result<Vec<&SleeveConfig>, SleeveError> {
        if names.is_empty() {
            return Ok(vec![self.get("macro").expect("builtin macro sleeve")]);
        }

        let mut out: Vec<&SleeveConfig> = Vec::new();
        let mut seen: Vec<&str> = Vec::new();
        for n in names {
            let key = n.trim();
            if key.is_empty() {
                continue;
            }
            let Some(cfg) = self.get(key) else {
                return Err(SleeveError::Unknown {
                    name: n.clone(),
                    known: self.known_keys(),
                });
            };
            if seen.contains(&cfg.name) {
                continue;
            }
            seen.push(cfg.name);
            out.push(cfg);
        }
        Ok(out)
    }

    /// Raw risk-budget shares per canonical sleeve name.
    pub fn risk_budget_shares<'a>(
        sleeves: impl IntoIterator<Item = &'a SleeveConfig>,
    ) -> BTreeMap<String, f64> {
        sleeves
            .into_iter()
            .map(|s| (s.name.to_string(), s.risk_budget_pct))
            .collect()
    }
}

fn to_tickers(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|t| t.trim().to_uppercase()).collect()
}

/// Lower-dollar, liquid, optionable, diversified across key macro exposures.
const STARTER_BASKET: &[&str] = &[
    "SPY", "QQQM", "IWM", "UUP", "GLDM", "SLV", "DBC", "IBIT", "VIXY", "SHY", "IEF", "TLT",
    "TIP", "HYG", "LQD", "SH", "TBT", "SMH", "KRE",
];

/// Housing cycle + mortgage rates + MBS proxies.
const HOUSING_BASKET: &[&str] = &[
    "MBB", "VMBS", "ITB", "XHB", "VNQ", "IYR", "REK", "SRS", "IEF", "TLT", "SHY", "SPY",
];

fn macro_universe(_basket: &str) -> Vec<String> {
    to_tickers(STARTER_BASKET)
}

fn vol_universe(_basket: &str) -> Vec<String> {
    // Liquid vol proxies + a couple of simple hedges used for de-risking.
    to_tickers(&["VIXY", "UVXY", "SVXY", "VXX", "VXZ", "SPY", "QQQ", "SH", "PSQ"])
}

fn ai_bubble_universe(_basket: &str) -> Vec<String> {
    // QQQ/SMH + a small whitelist of mega-cap/semis (highly optionable).
    to_tickers(&[
        "QQQ", "SMH", "NVDA", "AMD", "MSFT", "GOOGL", "AMZN", "META", "TSLA", "PLTR", "AVGO",
    ])
}

fn housing_universe(_basket: &str) -> Vec<String> {
    to_tickers(HOUSING_BASKET)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_resolves_to_canonical_sleeve() {
        let reg = SleeveRegistry::builtin();
        let resolved = reg.resolve(&["core".to_string()]).unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].name, "macro");
    }

    #[test]
    fn empty_input_defaults_to_macro() {
        let reg = SleeveRegistry::builtin();
        let resolved = reg.resolve(&[]).unwrap();
        assert_eq!(resolved[0].name, "macro");
    }

    #[test]
    fn unknown_sleeve_names_offender_and_known_keys() {
        let reg = SleeveRegistry::builtin();
        let err = reg.resolve(&["bogus".to_string()]).unwrap_err();
        let SleeveError::Unknown { name, known } = err;
        assert_eq!(name, "bogus");
        assert!(known.contains(&"macro".to_string()));
        assert!(known.contains(&"mbs".to_string()));
    }

    #[test]
    fn aliased_duplicates_dedupe_preserving_order() {
        let reg = SleeveRegistry::builtin();
        let names: Vec<String> = ["vol", "VOLATILITY", "macro", "core"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let resolved = reg.resolve(&names).unwrap();
        let out: Vec<_> = resolved.iter().map(|s| s.name).collect();
        assert_eq!(out, vec!["vol", "macro"]);
    }

    #[test]
    fn lookups_are_case_insensitive() {
        let reg = SleeveRegistry::builtin();
        assert_eq!(reg.get("Tech_Duration").unwrap().name, "ai-bubble");
    }

    #[test]
    fn feature_weights_prefer_longest_prefix() {
        let reg = SleeveRegistry::builtin();
        let vol = reg.get("vol").unwrap();
        assert_eq!(vol.weight_for_feature("vol_pressure_score"), 3.0);
        assert_eq!(vol.weight_for_feature("vol_term_slope"), 2.0);
        assert_eq!(vol.weight_for_feature("unrelated"), 1.0);

        let macro_sleeve = reg.get("macro").unwrap();
        assert_eq!(macro_sleeve.weight_for_feature("vol_term_slope"), 1.0);
    }

    #[test]
    fn budget_shares_map_canonical_names_to_raw_pcts() {
        let reg = SleeveRegistry::builtin();
        let resolved = reg
            .resolve(&["vol".to_string(), "housing".to_string()])
            .unwrap();
        let shares = SleeveRegistry::risk_budget_shares(resolved.into_iter());
        assert_eq!(shares.get("vol"), Some(&0.25));
        assert_eq!(shares.get("housing"), Some(&0.20));
        // Shares are raw, not normalized.
        assert!(shares.values().sum::<f64>() < 1.0);
    }

    #[test]
    fn universes_are_uppercased_tickers() {
        let reg = SleeveRegistry::builtin();
        let uni = reg.get("ai-bubble").unwrap().universe("starter");
        assert!(uni.contains(&"NVDA".to_string()));
        assert!(uni.iter().all(|t| t.chars().all(|c| c.is_ascii_uppercase())));
    }
}
