//! Completion candidates for `osdman call`.

use osdman_config::Config;

use crate::AppError;

/// Candidates for the next word after `call`, given the words typed so far.
///
/// No words yields domain names, one word yields that domain's verbs, and two
/// or more words yield nothing.
pub(crate) fn candidates<'a>(config: &'a Config, words: &[String]) -> Result<Vec<&'a str>, AppError> {
    match words {
        [] => Ok(config.domain_names().collect()),
        [domain] => config
            .domain(domain)
            .map(|found| found.verb_names().collect())
            .ok_or_else(|| AppError::UnknownDomain(domain.clone())),
        _ => Ok(Vec::new()),
    }
}
