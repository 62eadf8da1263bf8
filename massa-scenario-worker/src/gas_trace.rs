// Copyright (c) 2022 MASSA LABS <info@massa.net>

use massa_scenario_models::vm::GasTrace;
use massa_scenario_models::{ExprReconstructor, ReconstructorHint};

/// Gas tracing switch of each scenario being run, innermost last.
///
/// The outermost entry comes from the top-level scenario; every
/// `externalSteps` pushes one entry for the duration of the nested run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct GasTraceStack(Vec<bool>);

impl GasTraceStack {
    /// Starts over with the switch of a new top-level scenario
    pub fn reset(&mut self, trace_gas: bool) {
        self.0.clear();
        self.0.push(trace_gas);
    }

    pub fn push(&mut self, trace_gas: bool) {
        self.0.push(trace_gas);
    }

    pub fn pop(&mut self) -> Option<bool> {
        self.0.pop()
    }

    /// Switch of the innermost scenario, off when nothing runs
    pub fn peek(&self) -> bool {
        self.0.last().copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Prints the gas used per contract and function, then the total
pub(crate) fn print_gas_trace(gas_trace: &GasTrace, reconstructor: &ExprReconstructor) {
    let mut total_gas_used = 0u64;
    for (address, functions) in gas_trace {
        println!(
            "Gas Trace for SC Address: {}",
            reconstructor.reconstruct(address, ReconstructorHint::Address)
        );
        for (function, calls) in functions {
            let function_gas_used = calls
                .iter()
                .fold(0u64, |total, gas_used| total.saturating_add(*gas_used));
            println!(
                "GasTrace: functionName: {}, totalGasUsed: {}, numberOfCalls: {}",
                function,
                function_gas_used,
                calls.len()
            );
            total_gas_used = total_gas_used.saturating_add(function_gas_used);
        }
    }
    println!("TotalGasUsedByAPIs: {}", total_gas_used);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_inherits_and_pops() {
        let mut stack = GasTraceStack::default();
        assert!(!stack.peek());
        stack.reset(true);
        stack.push(stack.peek());
        assert!(stack.peek());
        stack.push(false);
        assert!(!stack.peek());
        assert_eq!(stack.pop(), Some(false));
        assert_eq!(stack.pop(), Some(true));
        assert_eq!(stack.len(), 1);
        stack.reset(false);
        assert_eq!(stack.len(), 1);
        assert!(!stack.peek());
    }
}
