//! Theory block → evaluation tree.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::{FunctionTable, ParamRef, TheoryLine};
use crate::error::{BuildError, BuildErrorKind};
use crate::integral::{DynamicKtKernel, LfFamily, StaticLfKernel};
use crate::models::{KernelKind, search};
use crate::plugin::{FactoryRegistry, GlobalPartRegistry, PluginLoader, StaticPluginLoader, UserFunction};

use super::node::{Evaluator, Terms, TheoryNode};

/// Everything a tree build needs besides the theory lines.
#[derive(Clone, Copy)]
pub struct BuildContext<'a> {
    /// Length of the fit-parameter vector.
    pub param_count: usize,
    /// Per-run map table, 1-based parameter numbers.
    pub run_map: &'a [i64],
    pub functions: &'a FunctionTable,
    pub factories: &'a FactoryRegistry,
    pub loader: &'a dyn PluginLoader,
    pub globals: &'a GlobalPartRegistry,
}

/// Long-lived state shared by all trees built for one model: user-function
/// factories, the module loader and the global-part registry.
pub struct TheorySession {
    factories: FactoryRegistry,
    loader: Box<dyn PluginLoader>,
    globals: Arc<GlobalPartRegistry>,
}

impl TheorySession {
    pub fn new(loader: Box<dyn PluginLoader>) -> Self {
        Self {
            factories: FactoryRegistry::new(),
            loader,
            globals: Arc::new(GlobalPartRegistry::new()),
        }
    }

    pub fn factories(&self) -> &FactoryRegistry {
        &self.factories
    }

    pub fn globals(&self) -> &Arc<GlobalPartRegistry> {
        &self.globals
    }

    pub fn context<'a>(
        &'a self,
        param_count: usize,
        run_map: &'a [i64],
        functions: &'a FunctionTable,
    ) -> BuildContext<'a> {
        BuildContext {
            param_count,
            run_map,
            functions,
            factories: &self.factories,
            loader: self.loader.as_ref(),
            globals: &self.globals,
        }
    }
}

impl Default for TheorySession {
    fn default() -> Self {
        Self::new(Box::new(StaticPluginLoader::new()))
    }
}

/// An evaluation tree for one run.
///
/// The topology is fixed at build time. Tabulated kernels keep their tables in
/// `RefCell`s, so a tree may move between threads but not be shared by them.
#[derive(Debug)]
pub struct TheoryTree {
    root: Box<TheoryNode>,
    param_count: usize,
}

impl TheoryTree {
    /// Build the tree for one run. Fails on the first bad line.
    pub fn build(lines: &[TheoryLine], ctx: &BuildContext<'_>) -> Result<Self, BuildError> {
        let mut terms: Vec<Vec<TheoryNode>> = vec![Vec::new()];
        let mut last_separator: Option<usize> = None;
        let mut user_index = 0;

        for line in lines {
            let content = line.content();
            if content.is_empty() {
                continue;
            }
            if line.is_separator() {
                let current_empty = terms.last().is_none_or(|t| t.is_empty());
                if current_empty {
                    return Err(BuildError::new(line.line_no, BuildErrorKind::MisplacedSeparator));
                }
                terms.push(Vec::new());
                last_separator = Some(line.line_no);
                continue;
            }
            let node = parse_line(line.line_no, content, ctx, &mut user_index)
                .map_err(|kind| BuildError::new(line.line_no, kind))?;
            if let Some(term) = terms.last_mut() {
                term.push(node);
            }
        }

        if terms.last().is_some_and(|t| t.is_empty()) {
            return Err(match last_separator {
                Some(line) => BuildError::new(line, BuildErrorKind::MisplacedSeparator),
                None => BuildError::new(
                    lines.first().map_or(0, |l| l.line_no),
                    BuildErrorKind::EmptyTheory,
                ),
            });
        }

        let term_count = terms.len();
        let factor_count: usize = terms.iter().map(Vec::len).sum();
        let root = terms
            .into_iter()
            .rev()
            .fold(None, |next_term: Option<Box<TheoryNode>>, term| {
                let mut head = chain_factors(term)?;
                head.add_child = next_term;
                Some(head)
            })
            .ok_or_else(|| BuildError::new(0, BuildErrorKind::EmptyTheory))?;

        info!(terms = term_count, factors = factor_count, "theory tree built");
        Ok(Self {
            root,
            param_count: ctx.param_count,
        })
    }

    /// Value of the theory at time `t` (µs).
    ///
    /// # Panics
    /// Panics if `params` or `funcs` are shorter than the vectors the tree was
    /// built against.
    #[inline]
    pub fn evaluate(&self, t: f64, params: &[f64], funcs: &[f64]) -> f64 {
        debug_assert!(params.len() >= self.param_count);
        self.root.evaluate(t, params, funcs)
    }

    pub fn root(&self) -> &TheoryNode {
        &self.root
    }

    /// Additive terms, each an iterator over its factors.
    pub fn terms(&self) -> Terms<'_> {
        Terms::new(&self.root)
    }

    /// Total integral solves performed by tabulated kernels in this tree.
    pub fn solve_count(&self) -> usize {
        self.root.solve_count()
    }
}

fn chain_factors(term: Vec<TheoryNode>) -> Option<Box<TheoryNode>> {
    term.into_iter().rev().fold(None, |next, mut node| {
        node.multiply_child = next;
        Some(Box::new(node))
    })
}

fn parse_line(
    line_no: usize,
    content: &str,
    ctx: &BuildContext<'_>,
    user_index: &mut usize,
) -> Result<TheoryNode, BuildErrorKind> {
    let mut tokens = content.split_whitespace();
    let name = tokens.next().unwrap_or_default();
    let info = search(name).ok_or_else(|| BuildErrorKind::UndefinedKernel(name.to_string()))?;
    let mut rest: Vec<&str> = tokens.collect();

    let evaluator = match info.kind {
        KernelKind::UserFcn => {
            if rest.len() < 2 {
                return Err(BuildErrorKind::ArityMismatch {
                    name: info.name,
                    expected: info.arity.describe(),
                    found: rest.len(),
                });
            }
            let ident: Vec<&str> = rest.drain(..2).collect();
            let index = *user_index;
            *user_index += 1;
            Evaluator::User(bind_user_function(ident[0], ident[1], index, ctx)?)
        }
        _ => {
            if !info.arity.accepts(rest.len()) {
                return Err(BuildErrorKind::ArityMismatch {
                    name: info.name,
                    expected: info.arity.describe(),
                    found: rest.len(),
                });
            }
            evaluator_for(info.kind)
        }
    };

    let params = rest
        .iter()
        .map(|token| parse_param(token, ctx))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(TheoryNode::new(info.kind, line_no, params, evaluator))
}

fn evaluator_for(kind: KernelKind) -> Evaluator {
    match kind {
        KernelKind::StaticGaussKtLf => Evaluator::StaticLf(StaticLfKernel::new(LfFamily::Gauss)),
        KernelKind::StaticLorentzKtLf => {
            Evaluator::StaticLf(StaticLfKernel::new(LfFamily::Lorentz))
        }
        KernelKind::DynamicGaussKtLf => Evaluator::DynamicKt(DynamicKtKernel::new(LfFamily::Gauss)),
        KernelKind::DynamicLorentzKtLf => {
            Evaluator::DynamicKt(DynamicKtKernel::new(LfFamily::Lorentz))
        }
        _ => Evaluator::Closed,
    }
}

/// Create the user function `type_name`, loading `module` if the type is not
/// registered yet, and bind its global part under `index`.
fn bind_user_function(
    module: &str,
    type_name: &str,
    index: usize,
    ctx: &BuildContext<'_>,
) -> Result<Box<dyn UserFunction>, BuildErrorKind> {
    let not_found = || BuildErrorKind::PluginNotFound {
        module: module.to_string(),
        type_name: type_name.to_string(),
    };

    let mut function = match ctx.factories.create(type_name) {
        Some(function) => function,
        None => {
            if let Err(err) = ctx.loader.load(module, ctx.factories) {
                warn!(module, type_name, %err, "user-function module not loaded");
                return Err(not_found());
            }
            ctx.factories.create(type_name).ok_or_else(not_found)?
        }
    };

    if function.needs_global_part() {
        function
            .bind_global_part(ctx.globals, index)
            .map_err(|source| BuildErrorKind::PluginBindFailed {
                type_name: type_name.to_string(),
                source,
            })?;
    }
    Ok(function)
}

fn parse_param(token: &str, ctx: &BuildContext<'_>) -> Result<ParamRef, BuildErrorKind> {
    if token.bytes().all(|b| b.is_ascii_digit()) {
        let number: usize = token
            .parse()
            .map_err(|_| BuildErrorKind::UnrecognizedToken(token.to_string()))?;
        // numbers at or past the function offset never address a parameter
        return match number.checked_sub(1).map(ParamRef::decode) {
            Some(ParamRef::Param(idx)) if idx < ctx.param_count => Ok(ParamRef::Param(idx)),
            _ => Err(BuildErrorKind::ParamOutOfRange {
                number,
                param_count: ctx.param_count,
            }),
        };
    }

    let lower = token.to_ascii_lowercase();
    if let Some(number) = keyword_number(&lower, "fun") {
        return ctx
            .functions
            .index_of(number)
            .map(ParamRef::Function)
            .ok_or(BuildErrorKind::UndefinedFunction(number));
    }
    if let Some(index) = keyword_number(&lower, "map") {
        return resolve_map(index, ctx);
    }
    Err(BuildErrorKind::UnrecognizedToken(token.to_string()))
}

/// `fun12` → `Some(12)` for keyword `fun`.
fn keyword_number(token: &str, keyword: &str) -> Option<usize> {
    let digits = token.strip_prefix(keyword)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn resolve_map(index: usize, ctx: &BuildContext<'_>) -> Result<ParamRef, BuildErrorKind> {
    let out_of_range = |reason: String| BuildErrorKind::MapOutOfRange { index, reason };
    if index == 0 {
        return Err(out_of_range("map indices start at 1".to_string()));
    }
    let entry = *ctx.run_map.get(index - 1).ok_or_else(|| {
        out_of_range(format!("the run map has {} entries", ctx.run_map.len()))
    })?;
    match usize::try_from(entry) {
        Ok(number) if (1..=ctx.param_count).contains(&number) => Ok(ParamRef::Param(number - 1)),
        _ => Err(out_of_range(format!(
            "entry {entry} is not a parameter number (1..={})",
            ctx.param_count
        ))),
    }
}
