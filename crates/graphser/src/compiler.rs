// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

// SourceCompiler trait - turns callable source text back into something
// invocable. The engine never evaluates source itself.

use std::any::Any;
use std::rc::Rc;

use crate::error::Result;

/// Reconstructs a callable from its source text on decode.
///
/// The decoder checks [`looks_like_callable`] before calling `compile`, so
/// implementations only see function-shaped text.
pub trait SourceCompiler {
    fn compile(&self, source: &str) -> Result<Rc<dyn Any>>;
}

// ---------------------------------------------------------------------------
// Source-only compiler (default)
// ---------------------------------------------------------------------------

/// Keeps the source text as the compiled form. Useful when the caller only
/// needs to inspect or re-encode callables.
#[derive(Debug, Default, Clone, Copy)]
pub struct SourceOnly;

impl SourceCompiler for SourceOnly {
    fn compile(&self, source: &str) -> Result<Rc<dyn Any>> {
        Ok(Rc::new(source.to_string()))
    }
}

impl<F> SourceCompiler for F
where
    F: Fn(&str) -> Result<Rc<dyn Any>>,
{
    fn compile(&self, source: &str) -> Result<Rc<dyn Any>> {
        self(source)
    }
}

const KEYWORD: &str = "function";

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Check the shape `function [name] ( params ) { body }`, optionally
/// wrapped in one pair of parentheses.
pub fn looks_like_callable(source: &str) -> bool {
    let mut text = source.trim();
    if let Some(inner) = text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        text = inner.trim();
    }

    let Some(rest) = text.strip_prefix(KEYWORD) else {
        return false;
    };
    if rest.starts_with(is_ident_char) {
        return false;
    }

    let rest = rest.trim_start();
    let rest = rest.trim_start_matches(is_ident_char).trim_start();
    let Some(params) = rest.strip_prefix('(') else {
        return false;
    };

    let mut depth = 1usize;
    let mut close = None;
    for (i, c) in params.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(i);
                    break;
                }
            }
            _ => {}
        }
    }
    let Some(close) = close else {
        return false;
    };

    let body = params[close + 1..].trim();
    body.starts_with('{') && body.ends_with('}')
}
