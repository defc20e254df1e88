use crate::telegram::{ANSWER_PREFIX, MAX_CALLBACK_DATA};
use derive_more::Display;
use std::{env, str::FromStr, time::Duration};

#[derive(Clone, Debug)]
pub struct Config {
    pub minimum_players: usize,
    /// Measured from prompt assignment.
    pub options_delay: Duration,
    /// Measured from prompt assignment, not from the options reveal.
    pub voting_delay: Duration,
    pub shared_prompts: Vec<String>,
    pub divergent_prompts: Vec<String>,
    pub answer_options: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Display)]
pub enum ConfigError {
    #[display(fmt = "{} is not a valid value for {}", _1, _0)]
    InvalidValue(&'static str, String),
    #[display(fmt = "{} must not be empty", _0)]
    Empty(&'static str),
    #[display(fmt = "MIN_PLAYERS must be at least 2")]
    TooFewPlayers,
    #[display(fmt = "VOTING_DELAY_MS must be greater than OPTIONS_DELAY_MS")]
    VotingBeforeOptions,
    #[display(fmt = "answer option {:?} is too long for a Telegram button", _0)]
    OptionTooLong(String),
}

impl std::error::Error for ConfigError {}

impl Default for Config {
    fn default() -> Config {
        Config {
            minimum_players: 4,
            options_delay: Duration::from_millis(3_000),
            voting_delay: Duration::from_millis(60_000),
            shared_prompts: to_strings(&["Apple", "Banana", "Orange", "Grape"]),
            divergent_prompts: to_strings(&["Car"]),
            answer_options: to_strings(&["Option A", "Option B", "Option C"]),
        }
    }
}

impl Config {
    /// Loads `.env` if present, then overrides the defaults with whatever is set in the
    /// environment.
    pub fn from_env() -> Result<Config, ConfigError> {
        dotenv::dotenv().ok();
        Config::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(v) = lookup("MIN_PLAYERS") {
            config.minimum_players = parse("MIN_PLAYERS", &v)?;
        }
        if let Some(v) = lookup("OPTIONS_DELAY_MS") {
            config.options_delay = Duration::from_millis(parse("OPTIONS_DELAY_MS", &v)?);
        }
        if let Some(v) = lookup("VOTING_DELAY_MS") {
            config.voting_delay = Duration::from_millis(parse("VOTING_DELAY_MS", &v)?);
        }
        if let Some(v) = lookup("SHARED_PROMPTS") {
            config.shared_prompts = split_list(&v);
        }
        if let Some(v) = lookup("DIVERGENT_PROMPTS") {
            config.divergent_prompts = split_list(&v);
        }
        if let Some(v) = lookup("ANSWER_OPTIONS") {
            config.answer_options = split_list(&v);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.minimum_players < 2 {
            return Err(ConfigError::TooFewPlayers);
        }
        if self.voting_delay <= self.options_delay {
            return Err(ConfigError::VotingBeforeOptions);
        }
        if self.shared_prompts.is_empty() {
            return Err(ConfigError::Empty("SHARED_PROMPTS"));
        }
        if self.divergent_prompts.is_empty() {
            return Err(ConfigError::Empty("DIVERGENT_PROMPTS"));
        }
        if self.answer_options.is_empty() {
            return Err(ConfigError::Empty("ANSWER_OPTIONS"));
        }
        if let Some(option) = self
            .answer_options
            .iter()
            .find(|o| ANSWER_PREFIX.len() + o.len() > MAX_CALLBACK_DATA)
        {
            return Err(ConfigError::OptionTooLong(option.clone()));
        }
        Ok(())
    }
}

fn parse<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(key, value.to_string()))
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = Config::from_lookup(|_| None).unwrap();

        assert_eq!(config.minimum_players, 4);
        assert_eq!(config.options_delay, Duration::from_millis(3_000));
        assert_eq!(config.voting_delay, Duration::from_millis(60_000));
        assert_eq!(config.shared_prompts[0], "Apple");
        assert_eq!(config.divergent_prompts, vec!["Car".to_string()]);
        assert_eq!(config.answer_options.len(), 3);
    }

    #[test]
    fn overrides_from_environment() {
        let config = Config::from_lookup(lookup_from(&[
            ("MIN_PLAYERS", "3"),
            ("OPTIONS_DELAY_MS", "100"),
            ("VOTING_DELAY_MS", "200"),
            ("SHARED_PROMPTS", "Cat, Dog ,,Fish"),
        ]))
        .unwrap();

        assert_eq!(config.minimum_players, 3);
        assert_eq!(config.options_delay, Duration::from_millis(100));
        assert_eq!(config.voting_delay, Duration::from_millis(200));
        assert_eq!(config.shared_prompts, vec!["Cat", "Dog", "Fish"]);
    }

    #[test]
    fn rejects_bad_values() {
        assert_eq!(
            Config::from_lookup(lookup_from(&[("MIN_PLAYERS", "four")])).unwrap_err(),
            ConfigError::InvalidValue("MIN_PLAYERS", "four".to_string())
        );
        assert_eq!(
            Config::from_lookup(lookup_from(&[("MIN_PLAYERS", "1")])).unwrap_err(),
            ConfigError::TooFewPlayers
        );
        assert_eq!(
            Config::from_lookup(lookup_from(&[("VOTING_DELAY_MS", "3000")])).unwrap_err(),
            ConfigError::VotingBeforeOptions
        );
        assert_eq!(
            Config::from_lookup(lookup_from(&[("ANSWER_OPTIONS", " , ")])).unwrap_err(),
            ConfigError::Empty("ANSWER_OPTIONS")
        );
    }

    #[test]
    fn answer_options_must_fit_in_callback_data() {
        let longest = "x".repeat(MAX_CALLBACK_DATA - ANSWER_PREFIX.len());
        let too_long = format!("{}x", longest);

        let config = Config::from_lookup(lookup_from(&[("ANSWER_OPTIONS", longest.as_str())])).unwrap();
        assert_eq!(config.answer_options, vec![longest.clone()]);

        let list = format!("Short,{}", too_long);
        assert_eq!(
            Config::from_lookup(lookup_from(&[("ANSWER_OPTIONS", list.as_str())])).unwrap_err(),
            ConfigError::OptionTooLong(too_long)
        );
    }
}
