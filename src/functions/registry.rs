use rustc_hash::FxHashMap;
use std::sync::{Arc, OnceLock};

use super::Function;
use crate::Expr;

/// Definition of a built-in function: evaluation, derivative and antiderivative
#[derive(Clone)]
pub(crate) struct FunctionDefinition {
    /// Canonical name of the function (e.g., "sin")
    pub name: &'static str,

    /// The enum tag this definition belongs to
    pub func: Function,

    /// Numerical evaluation; `None` outside the real domain
    pub eval: fn(f64) -> Option<f64>,

    /// Symbolic differentiation
    /// Arguments: (argument of the call, derivative of the argument)
    /// Returns the total derivative f'(u) * u'
    pub derivative: fn(&Arc<Expr>, Expr) -> Expr,

    /// Antiderivative F with F'(u) = f(u), if it lies inside the function set.
    /// The integrator divides by the slope when `u` is linear.
    pub antiderivative: Option<fn(&Arc<Expr>) -> Expr>,
}

/// Static registry storing all function definitions
static REGISTRY: OnceLock<FxHashMap<&'static str, FunctionDefinition>> = OnceLock::new();

/// Initialize the registry with all function definitions
fn init_registry() -> FxHashMap<&'static str, FunctionDefinition> {
    let defs = super::definitions::all_definitions();
    let mut map = FxHashMap::with_capacity_and_hasher(defs.len(), Default::default());
    for def in defs {
        map.insert(def.name, def);
    }
    map
}

/// Central registry for getting function definitions
pub(crate) struct Registry;

impl Registry {
    /// Get a function definition by name
    pub(crate) fn get(name: &str) -> Option<&'static FunctionDefinition> {
        REGISTRY.get_or_init(init_registry).get(name)
    }

    /// Get the definition of a known function
    pub(crate) fn of(func: Function) -> Option<&'static FunctionDefinition> {
        Self::get(func.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_function_registered() {
        for f in Function::ALL {
            let def = Registry::of(f);
            assert!(def.is_some(), "missing definition for {}", f.name());
            assert_eq!(def.map(|d| d.func), Some(f));
        }
    }
}
