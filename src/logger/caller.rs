//! Call-stack capture for caller annotations.
//!
//! Every location is rendered as `"<file>: <line> <function>"`. Frames that
//! resolve to nothing usable are skipped; when symbols are stripped the
//! function name may be all that is left.
//!
//! Call sites seen by [`locate`] are cached, so the stack is walked once per
//! site rather than once per record.

use std::ops::ControlFlow;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use dashmap::DashMap;

/// Upper bound on frames recorded by a full stack capture.
pub const MAX_CALLER_DEPTH: usize = 25;

/// Hard cap on raw frames walked per capture.
const MAX_WALK: usize = 256;

/// Symbol suffix of [`capture`], used to find where our own frames end.
const ANCHOR: &str = "caller::capture";

/// Call site `(file, line, column)` of a level method.
type SiteKey = (&'static str, u32, u32);

/// Enclosing function per call site; `None` when it could not be resolved.
static FUNCTIONS: LazyLock<DashMap<SiteKey, Option<Arc<str>>>> = LazyLock::new(DashMap::new);

/// One logical frame. Inlined calls show up as separate sites.
#[derive(Debug, Default)]
struct Site {
    file: Option<PathBuf>,
    line: Option<u32>,
    function: Option<String>,
}

impl Site {
    fn from_symbol(symbol: &backtrace::Symbol) -> Self {
        Self {
            file: symbol.filename().map(Path::to_path_buf),
            line: symbol.lineno(),
            // `{:#}` drops the trailing hash from legacy mangled names.
            function: symbol.name().map(|name| format!("{:#}", name)),
        }
    }

    fn is_anchor(&self) -> bool {
        self.function
            .as_deref()
            .is_some_and(|name| name.ends_with(ANCHOR))
    }

    fn render(&self) -> Option<String> {
        match (&self.file, self.line, &self.function) {
            (Some(file), Some(line), Some(function)) => {
                Some(format!("{}: {} {}", file.display(), line, function))
            }
            (Some(file), Some(line), None) => Some(format!("{}: {}", file.display(), line)),
            (_, _, Some(function)) => Some(function.clone()),
            _ => None,
        }
    }
}

/// Walk the current stack innermost-first, one logical frame at a time.
fn walk(mut visit: impl FnMut(Site) -> ControlFlow<()>) {
    let mut frames = Vec::with_capacity(32);
    backtrace::trace(|frame| {
        frames.push(frame.clone());
        frames.len() < MAX_WALK
    });

    for frame in &frames {
        let mut flow = ControlFlow::Continue(());
        backtrace::resolve_frame(frame, |symbol| {
            if flow.is_continue() {
                flow = visit(Site::from_symbol(symbol));
            }
        });
        if flow.is_break() {
            return;
        }
    }
}

/// Render up to `depth` frames, starting `skip` frames above the caller of
/// this function (`skip == 0` is that caller itself).
///
/// Returns an empty list when the stack cannot be resolved at all.
#[inline(never)]
pub(crate) fn capture(skip: usize, depth: usize) -> Vec<String> {
    let mut callers = Vec::new();
    let mut anchored = false;
    let mut seen = 0usize;

    walk(|site| {
        if !anchored {
            anchored = site.is_anchor();
            return ControlFlow::Continue(());
        }
        if site.is_anchor() {
            return ControlFlow::Continue(());
        }
        seen += 1;
        if seen <= skip {
            return ControlFlow::Continue(());
        }
        if let Some(rendered) = site.render() {
            callers.push(rendered);
        }
        if callers.len() >= depth {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    });

    callers
}

/// Render a `#[track_caller]` location, recovering the enclosing function
/// name from the stack when debug info allows.
pub(crate) fn locate(location: &'static Location<'static>) -> String {
    let key = site_key(location);
    let cached = FUNCTIONS.get(&key).map(|entry| entry.value().clone());
    let function = match cached {
        Some(function) => function,
        None => {
            let resolved = enclosing_function(location).map(Arc::from);
            FUNCTIONS.insert(key, resolved.clone());
            resolved
        }
    };

    match function {
        Some(function) => format!("{}: {} {}", location.file(), location.line(), function),
        None => format!("{}: {}", location.file(), location.line()),
    }
}

fn site_key(location: &'static Location<'static>) -> SiteKey {
    (location.file(), location.line(), location.column())
}

fn enclosing_function(location: &Location<'_>) -> Option<String> {
    let wanted = Path::new(location.file());
    let mut function = None;

    walk(|site| {
        let matches = site.line == Some(location.line())
            && site.file.as_deref().is_some_and(|file| file.ends_with(wanted));
        if matches {
            function = site.function;
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    });
    function
}
