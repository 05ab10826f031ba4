mod error;
mod normalize;
mod table;
mod target;

use anyhow::Context;
use askama::Template;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::num::NonZeroUsize;
use std::path::{Component, Path, PathBuf};
use std::thread;

pub use error::{DecodeError, Error, PageError, Result};
pub use normalize::{normalize, normalize_request_path};
pub use table::{Resolution, Rule, RuleTable};
pub use target::Target;

pub const RULES_FILE: &str = "redirects";
pub const OPTIONS_FILE: &str = "redirects.toml";
pub const CLIENT_MODULE: &str = "html-redirects.js";

#[derive(serde::Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    pub countdown: i64,
    pub enable_history_redirect: bool,
    pub base: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            countdown: 3,
            enable_history_redirect: false,
            base: "/".to_owned(),
        }
    }
}

impl Options {
    fn from_file(file: &Path) -> Result<Self> {
        match fs::read_to_string(file) {
            Ok(contents) => Ok(toml::from_str(&contents)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Redirects {
    pub table: RuleTable,
    pub options: Options,
}

impl Redirects {
    /// `Ok(None)` when there is no rule file.
    pub fn load(source_dir: &Path) -> Result<Option<Self>> {
        let contents = match fs::read_to_string(source_dir.join(RULES_FILE)) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let table = RuleTable::parse(&contents)?;
        let options = Options::from_file(&source_dir.join(OPTIONS_FILE))?;
        Ok(Some(Self { table, options }))
    }

    pub fn snapshot(&self) -> ClientSnapshot<'_> {
        ClientSnapshot::new(&self.table, self.options.enable_history_redirect)
    }

    /// Write one page per internal source into `output_dir`. Failures are
    /// collected, not short-circuited.
    pub fn write_pages(&self, output_dir: &Path) -> Result<Vec<PathBuf>> {
        let mut seen = HashSet::new();
        let mut jobs = Vec::new();
        let mut failures = Vec::new();
        for rule in self.table.rules() {
            if !target::is_internal(&rule.source) {
                tracing::warn!(source = %rule.source, "[redirect] Skipping rule with external source");
                continue;
            }
            let path = match page_path(output_dir, &rule.source) {
                Ok(path) => path,
                Err(cause) => {
                    failures.push(PageError {
                        path: PathBuf::from(&rule.source),
                        cause: Box::new(cause),
                    });
                    continue;
                }
            };
            // `/a/`, `/./a/` and `/a//` share a page; the first rule owns it.
            if !seen.insert(path.clone()) {
                tracing::debug!(source = %rule.source, "[redirect] Skipping shadowed duplicate rule");
                continue;
            }
            jobs.push((rule, path));
        }

        let workers = thread::available_parallelism().map_or(4, NonZeroUsize::get);
        let mut written = Vec::new();
        for chunk in jobs.chunks(workers) {
            let results = thread::scope(|scope| {
                let handles = chunk
                    .iter()
                    .map(|(rule, path)| scope.spawn(move || self.write_page(rule, path, output_dir)))
                    .collect::<Vec<_>>();
                handles
                    .into_iter()
                    .map(|handle| handle.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
                    .collect::<Vec<_>>()
            });
            for result in results {
                match result {
                    Ok(path) => written.push(path),
                    Err(e) => failures.push(e),
                }
            }
        }

        if failures.is_empty() {
            Ok(written)
        } else {
            Err(Error::Pages(failures))
        }
    }

    fn write_page(&self, rule: &Rule, path: &Path, output_dir: &Path) -> Result<PathBuf, PageError> {
        let page = RedirectPage::new(
            &rule.destination,
            self.options.countdown,
            &self.options.base,
        );
        page.write(path).map_err(|cause| PageError {
            path: path.to_path_buf(),
            cause: Box::new(cause),
        })?;
        tracing::info!(
            "[redirect] Generated redirect page: {}",
            path.strip_prefix(output_dir).unwrap_or(path).display()
        );
        tracing::info!("[redirect] {} -> {}", rule.source, rule.destination);
        Ok(path.to_path_buf())
    }
}

/// File a page for `source` is written to: the source as a directory under
/// `output_dir`, plus `index.html`.
pub fn page_path(output_dir: &Path, source: &str) -> Result<PathBuf> {
    let unsafe_path = || Error::UnsafePath {
        source_path: source.to_owned(),
    };
    let mut path = output_dir.to_path_buf();
    for component in Path::new(source.trim_start_matches('/')).components() {
        match component {
            Component::Normal(c) => path.push(c),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(unsafe_path())
            }
        }
    }
    path.push("index.html");
    Ok(path)
}

fn script_json(value: serde_json::Value) -> String {
    value.to_string().replace('<', "\\u003c")
}

#[derive(Template)]
#[template(path = "redirect.html")]
pub struct RedirectPage {
    countdown: i64,
    refresh_secs: i64,
    href: String,
    href_json: String,
}

impl RedirectPage {
    pub fn new(destination: &Target, countdown: i64, base: &str) -> Self {
        let href = destination.href(base);
        Self {
            countdown,
            refresh_secs: countdown.max(0),
            href_json: script_json(href.as_str().into()),
            href,
        }
    }

    fn write(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, self.render()?)?;
        Ok(())
    }
}

#[derive(Serialize, Debug)]
pub struct ClientSnapshot<'a> {
    pub enable_history_redirect: bool,
    pub redirects: Vec<(&'a str, &'a Target)>,
}

impl<'a> ClientSnapshot<'a> {
    pub fn new(table: &'a RuleTable, enable_history_redirect: bool) -> Self {
        Self {
            enable_history_redirect,
            redirects: table
                .rules()
                .iter()
                .map(|rule| (rule.source.as_str(), &rule.destination))
                .collect(),
        }
    }

    pub fn to_module(&self) -> Result<String> {
        let module = ClientModule {
            enable_history_redirect: self.enable_history_redirect,
            redirects_json: script_json(serde_json::to_value(&self.redirects)?),
        };
        Ok(module.render()?)
    }

    fn write(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_module()?)?;
        Ok(())
    }
}

#[derive(Template)]
#[template(path = "html-redirects.js", escape = "none")]
struct ClientModule {
    enable_history_redirect: bool,
    redirects_json: String,
}

#[derive(Debug, Default)]
pub struct Summary {
    pub rules: usize,
    pub pages: Vec<PathBuf>,
}

/// Generate the redirect pages for the site in `source_dir` into `output_dir`.
///
/// Without a rule file this does nothing.
pub fn compile(source_dir: impl AsRef<Path>, output_dir: impl AsRef<Path>) -> anyhow::Result<Summary> {
    let (source_dir, output_dir) = (source_dir.as_ref(), output_dir.as_ref());
    let Some(redirects) = Redirects::load(source_dir)
        .with_context(|| format!("loading redirects from {}", source_dir.display()))?
    else {
        tracing::debug!(dir = %source_dir.display(), "[redirect] No rule file, nothing to do");
        return Ok(Summary::default());
    };

    fs::create_dir_all(output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;
    let pages = redirects.write_pages(output_dir)?;
    redirects
        .snapshot()
        .write(&output_dir.join(CLIENT_MODULE))
        .with_context(|| format!("writing {CLIENT_MODULE}"))?;

    Ok(Summary {
        rules: redirects.table.len(),
        pages,
    })
}
