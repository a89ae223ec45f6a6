use crate::config::WatchConfig;

/// Outcome of running a title through the keyword gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    /// An exclude keyword matched; include keywords were not consulted.
    Excluded(String),
    /// No include keyword matched.
    NotIncluded,
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }
}

/// Case-insensitive substring gate over entry titles.
///
/// Exclusion always wins. An empty include set accepts every title that is
/// not excluded.
#[derive(Debug, Clone, Default)]
pub struct KeywordFilter {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl KeywordFilter {
    pub fn new<I, J, S, T>(include: I, exclude: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Self {
            include: lowercase_set(include),
            exclude: lowercase_set(exclude),
        }
    }

    pub fn from_config(config: &WatchConfig) -> Self {
        Self::new(&config.include_keywords, &config.exclude_keywords)
    }

    pub fn classify(&self, title: &str) -> Verdict {
        let title = title.to_lowercase();

        if let Some(hit) = self.exclude.iter().find(|k| title.contains(k.as_str())) {
            return Verdict::Excluded(hit.clone());
        }

        if self.include.is_empty() || self.include.iter().any(|k| title.contains(k.as_str())) {
            Verdict::Accepted
        } else {
            Verdict::NotIncluded
        }
    }

    pub fn accepts(&self, title: &str) -> bool {
        self.classify(title).is_accepted()
    }
}

fn lowercase_set<I, S>(keywords: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for keyword in keywords {
        let keyword = keyword.as_ref().trim().to_lowercase();
        if !keyword.is_empty() && !out.contains(&keyword) {
            out.push(keyword);
        }
    }
    out
}
