use crate::error::{Error, Result};
use crate::normalize::normalize;
use crate::target::Target;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub source: String,
    pub destination: Target,
}

impl Rule {
    pub fn new(source: &str, destination: &str) -> Result<Self, crate::DecodeError> {
        Ok(Self {
            source: normalize(source)?,
            destination: Target::classify(normalize(destination)?),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    Found(&'a Target),
    NotFound,
}

impl<'a> Resolution<'a> {
    pub fn found(self) -> Option<&'a Target> {
        match self {
            Resolution::Found(target) => Some(target),
            Resolution::NotFound => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// One `<source> <destination>` pair per non-blank line.
    pub fn parse(contents: &str) -> Result<Self> {
        let mut rules = Vec::new();
        for (index, text) in contents.lines().enumerate() {
            if text.trim().is_empty() {
                continue;
            }
            let line = index + 1;
            let fields = text.split(' ').filter(|f| !f.is_empty()).collect::<Vec<_>>();
            let [source, destination] = fields[..] else {
                return Err(Error::MalformedRule {
                    line,
                    fields: fields.len(),
                });
            };
            let rule = Rule::new(source, destination)
                .map_err(|source| Error::Decode { line, source })?;
            rules.push(rule);
        }
        Ok(Self { rules })
    }

    /// `path` must already be normalized. First match in file order wins.
    pub fn resolve(&self, path: &str) -> Resolution<'_> {
        self.rules
            .iter()
            .find(|rule| rule.source == path)
            .map_or(Resolution::NotFound, |rule| Resolution::Found(&rule.destination))
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
