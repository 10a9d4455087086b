//! Sum-of-products evaluation tree.
//!
//! A theory block denotes `Σ_terms Π_factors kernel(t)`. Each factor is a
//! node; `multiply_child` links the next factor of the same term and
//! `add_child` (set on term heads only) links the head of the next term, so
//! every node evaluates to `kernel · (multiply or 1) + (add or 0)`.

use crate::domain::ParamRef;
use crate::integral::{DynamicKtKernel, StaticLfKernel};
use crate::models::{KernelKind, kernels};
use crate::plugin::UserFunction;

/// Parameter vectors up to this length are resolved on the stack.
const INLINE_PARAMS: usize = 8;

/// How a node turns its resolved parameters into a value.
pub(crate) enum Evaluator {
    Closed,
    StaticLf(StaticLfKernel),
    DynamicKt(DynamicKtKernel),
    User(Box<dyn UserFunction>),
}

impl std::fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Evaluator::Closed => f.write_str("Closed"),
            Evaluator::StaticLf(k) => f.debug_tuple("StaticLf").field(k).finish(),
            Evaluator::DynamicKt(k) => f.debug_tuple("DynamicKt").field(k).finish(),
            Evaluator::User(_) => f.write_str("User(..)"),
        }
    }
}

#[derive(Debug)]
pub struct TheoryNode {
    kind: KernelKind,
    line: usize,
    params: Vec<ParamRef>,
    evaluator: Evaluator,
    pub(crate) multiply_child: Option<Box<TheoryNode>>,
    pub(crate) add_child: Option<Box<TheoryNode>>,
}

impl TheoryNode {
    pub(crate) fn new(
        kind: KernelKind,
        line: usize,
        params: Vec<ParamRef>,
        evaluator: Evaluator,
    ) -> Self {
        Self {
            kind,
            line,
            params,
            evaluator,
            multiply_child: None,
            add_child: None,
        }
    }

    pub fn kind(&self) -> KernelKind {
        self.kind
    }

    /// Source line this node was built from.
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn params(&self) -> &[ParamRef] {
        &self.params
    }

    pub fn multiply_child(&self) -> Option<&TheoryNode> {
        self.multiply_child.as_deref()
    }

    pub fn add_child(&self) -> Option<&TheoryNode> {
        self.add_child.as_deref()
    }

    pub fn evaluate(&self, t: f64, params: &[f64], funcs: &[f64]) -> f64 {
        let mut value = self.kernel_value(t, params, funcs);
        if let Some(next) = &self.multiply_child {
            value *= next.evaluate(t, params, funcs);
        }
        if let Some(next) = &self.add_child {
            value += next.evaluate(t, params, funcs);
        }
        value
    }

    fn kernel_value(&self, t: f64, params: &[f64], funcs: &[f64]) -> f64 {
        let n = self.params.len();
        if n <= INLINE_PARAMS {
            let mut buf = [0.0; INLINE_PARAMS];
            for (slot, r) in buf.iter_mut().zip(&self.params) {
                *slot = r.resolve(params, funcs);
            }
            self.apply(t, &buf[..n])
        } else {
            let val: Vec<f64> = self.params.iter().map(|r| r.resolve(params, funcs)).collect();
            self.apply(t, &val)
        }
    }

    fn apply(&self, t: f64, val: &[f64]) -> f64 {
        match &self.evaluator {
            Evaluator::Closed => kernels::evaluate(self.kind, t, val).unwrap_or_default(),
            Evaluator::StaticLf(kernel) => kernel.value(t, val),
            Evaluator::DynamicKt(kernel) => kernel.value(t, val),
            Evaluator::User(function) => function.evaluate(t, val),
        }
    }

    /// Integral solves performed by this node alone.
    pub fn own_solve_count(&self) -> usize {
        match &self.evaluator {
            Evaluator::StaticLf(kernel) => kernel.solve_count(),
            Evaluator::DynamicKt(kernel) => kernel.solve_count(),
            Evaluator::Closed | Evaluator::User(_) => 0,
        }
    }

    /// Integral solves performed by this node and everything below it.
    pub fn solve_count(&self) -> usize {
        self.own_solve_count()
            + self.multiply_child.as_ref().map_or(0, |n| n.solve_count())
            + self.add_child.as_ref().map_or(0, |n| n.solve_count())
    }
}

/// Iterator over the heads of the additive terms.
pub struct Terms<'a> {
    next: Option<&'a TheoryNode>,
}

impl<'a> Terms<'a> {
    pub(crate) fn new(root: &'a TheoryNode) -> Self {
        Self { next: Some(root) }
    }
}

impl<'a> Iterator for Terms<'a> {
    type Item = Factors<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let head = self.next?;
        self.next = head.add_child();
        Some(Factors { next: Some(head) })
    }
}

/// Iterator over the factors of one term.
pub struct Factors<'a> {
    next: Option<&'a TheoryNode>,
}

impl<'a> Iterator for Factors<'a> {
    type Item = &'a TheoryNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        self.next = node.multiply_child();
        Some(node)
    }
}
