use super::error::{CalculatorError, Result};
use super::models::OperationKind;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, MathematicalOps};

pub type OperationFn = fn(Decimal, Decimal) -> Result<Decimal>;

/// Decimal places at which an iterated root is checked for being exact.
const ROOT_SNAP_DP: u32 = 20;
const NEWTON_ITERATIONS: usize = 64;
const MAX_SCALE: u32 = 28;

/// Looks up an operation by command id or display name.
pub fn resolve(operation_id: &str) -> Result<(OperationKind, OperationFn)> {
    let kind: OperationKind = operation_id.parse()?;
    Ok((kind, function_for(kind)))
}

pub fn function_for(kind: OperationKind) -> OperationFn {
    match kind {
        OperationKind::Add => add,
        OperationKind::Subtract => subtract,
        OperationKind::Multiply => multiply,
        OperationKind::Divide => divide,
        OperationKind::Power => power,
        OperationKind::Root => root,
        OperationKind::Modulus => modulus,
        OperationKind::IntDivide => int_divide,
        OperationKind::Percentage => percentage,
        OperationKind::AbsDiff => abs_diff,
    }
}

fn unrepresentable() -> CalculatorError {
    CalculatorError::invalid("Result cannot be represented")
}

fn add(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_add(b).ok_or_else(unrepresentable)
}

fn subtract(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_sub(b).ok_or_else(unrepresentable)
}

fn multiply(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_mul(b).ok_or_else(unrepresentable)
}

fn divide(a: Decimal, b: Decimal) -> Result<Decimal> {
    if b.is_zero() {
        return Err(CalculatorError::DivisionByZero);
    }
    a.checked_div(b).ok_or_else(unrepresentable)
}

// Sign follows the dividend.
fn modulus(a: Decimal, b: Decimal) -> Result<Decimal> {
    if b.is_zero() {
        return Err(CalculatorError::DivisionByZero);
    }
    a.checked_rem(b).ok_or_else(unrepresentable)
}

fn int_divide(a: Decimal, b: Decimal) -> Result<Decimal> {
    Ok(divide(a, b)?.trunc())
}

fn percentage(a: Decimal, b: Decimal) -> Result<Decimal> {
    divide(a, b)?
        .checked_mul(Decimal::ONE_HUNDRED)
        .ok_or_else(unrepresentable)
}

fn abs_diff(a: Decimal, b: Decimal) -> Result<Decimal> {
    Ok(subtract(a, b)?.abs())
}

fn power(base: Decimal, exponent: Decimal) -> Result<Decimal> {
    if base == Decimal::ONE {
        return Ok(Decimal::ONE);
    }
    if exponent < Decimal::ZERO {
        if base.is_zero() {
            return Err(CalculatorError::invalid(
                "Zero cannot be raised to a negative power",
            ));
        }
        let positive = power(base, -exponent)?;
        return Decimal::ONE.checked_div(positive).ok_or_else(unrepresentable);
    }

    let whole = exponent.trunc();
    let fraction = exponent - whole;
    if !fraction.is_zero() && base < Decimal::ZERO {
        return Err(CalculatorError::invalid(
            "Negative base with a fractional exponent has no real result",
        ));
    }
    if base.is_zero() {
        return Ok(if exponent.is_zero() {
            Decimal::ONE
        } else {
            Decimal::ZERO
        });
    }

    // Exponents past u64 only have a representable result for |base| <= 1.
    let whole_power = match whole.to_u64() {
        Some(n) => base.checked_powu(n).ok_or_else(unrepresentable)?,
        None if base.abs() == Decimal::ONE => {
            if is_odd(whole) {
                base
            } else {
                Decimal::ONE
            }
        }
        None if base.abs() < Decimal::ONE => Decimal::ZERO,
        None => return Err(unrepresentable()),
    };
    if fraction.is_zero() {
        return Ok(whole_power);
    }

    let fractional_power = if fraction == Decimal::new(5, 1) {
        base.sqrt()
    } else {
        base.checked_powd(fraction)
    }
    .ok_or_else(unrepresentable)?;
    whole_power
        .checked_mul(fractional_power)
        .ok_or_else(unrepresentable)
}

fn is_odd(integral: Decimal) -> bool {
    !(integral % Decimal::TWO).is_zero()
}

fn root(value: Decimal, degree: Decimal) -> Result<Decimal> {
    if degree.is_zero() {
        return Err(CalculatorError::invalid("Zero root is undefined"));
    }
    if degree < Decimal::ZERO {
        if value.is_zero() {
            return Err(CalculatorError::invalid(
                "Zero has no root of negative degree",
            ));
        }
        let positive = root(value, -degree)?;
        return Decimal::ONE.checked_div(positive).ok_or_else(unrepresentable);
    }

    let integral = degree.fract().is_zero();

    if value < Decimal::ZERO {
        // Only odd integral degrees have a real root of a negative number.
        if integral && is_odd(degree) {
            return Ok(-root(-value, degree)?);
        }
        return Err(CalculatorError::invalid(
            "Cannot calculate root of negative number",
        ));
    }
    if value.is_zero() {
        return Ok(Decimal::ZERO);
    }

    let integral_degree = if integral { degree.to_u64() } else { None };
    match integral_degree.and_then(|n| nth_root(value, n)) {
        Some(result) => Ok(result),
        None => {
            let exponent = Decimal::ONE.checked_div(degree).ok_or_else(unrepresentable)?;
            value.checked_powd(exponent).ok_or_else(unrepresentable)
        }
    }
}

/// Newton iteration seeded from a float estimate, snapped to an exact
/// value when one exists at `ROOT_SNAP_DP` places.
fn nth_root(value: Decimal, degree: u64) -> Option<Decimal> {
    if degree == 1 {
        return Some(value);
    }

    let mut x = if degree == 2 {
        value.sqrt()?
    } else {
        let estimate = value.to_f64()?.powf(1.0 / degree as f64);
        let mut x = Decimal::from_f64(estimate)?;
        let n = Decimal::from(degree);
        for _ in 0..NEWTON_ITERATIONS {
            let lower = x.checked_powu(degree - 1)?;
            if lower.is_zero() {
                break;
            }
            let next = x
                .checked_mul(n - Decimal::ONE)?
                .checked_add(value.checked_div(lower)?)?
                .checked_div(n)?;
            if next == x {
                break;
            }
            x = next;
        }
        x
    };

    // The check is only exact while the power of the candidate fits in
    // `Decimal`'s 28 places; past that the comparison rounds.
    let snapped = x.round_dp(ROOT_SNAP_DP).normalize();
    let exact_scale = u64::from(snapped.scale())
        .checked_mul(degree)
        .is_some_and(|scale| scale <= u64::from(MAX_SCALE));
    if exact_scale && snapped.checked_powu(degree) == Some(value) {
        x = snapped;
    }
    Some(x)
}
