// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Expression evaluator.

use super::ast::{BinOp, CmpOp, Expr, UnaryOp};
use super::{ExprError, Scope};
use indexmap::IndexMap;
use sf_core::Value;

/// Evaluate a parsed expression. `input` is carried for error messages.
pub fn evaluate(expr: &Expr, scope: &dyn Scope, input: &str) -> Result<Value, ExprError> {
    Evaluator { scope, input }.eval(expr)
}

struct Evaluator<'a> {
    scope: &'a dyn Scope,
    input: &'a str,
}

impl Evaluator<'_> {
    fn type_error(&self, reason: impl Into<String>) -> ExprError {
        ExprError::Type {
            expression: self.input.to_string(),
            reason: reason.into(),
        }
    }

    fn eval(&self, expr: &Expr) -> Result<Value, ExprError> {
        match expr {
            Expr::Literal(v) => Ok(v.clone()),
            Expr::Name(name) => {
                self.scope
                    .lookup(name)
                    .ok_or_else(|| ExprError::UnknownVariable {
                        expression: self.input.to_string(),
                        name: name.clone(),
                    })
            }
            Expr::Field { base, name } => {
                let base_value = self.eval(base)?;
                match base_value {
                    Value::Map(map) => map.get(name).cloned().ok_or_else(|| {
                        self.type_error(format!("map has no field `{}`", name))
                    }),
                    other => Err(self.type_error(format!(
                        "cannot access field `{}` on {}",
                        name,
                        other.type_name()
                    ))),
                }
            }
            Expr::Index { base, index } => {
                let base_value = self.eval(base)?;
                let index_value = self.eval(index)?;
                self.eval_index(base_value, index_value)
            }
            Expr::Unary { op, operand } => {
                let value = self.eval(operand)?;
                match op {
                    UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
                    UnaryOp::Neg => match value {
                        Value::Int(i) => Ok(Value::Int(-i)),
                        Value::Float(f) => Ok(Value::Float(-f)),
                        other => {
                            Err(self.type_error(format!("cannot negate {}", other.type_name())))
                        }
                    },
                    UnaryOp::Pos => match value {
                        Value::Int(_) | Value::Float(_) => Ok(value),
                        other => Err(self.type_error(format!(
                            "unary `+` requires a number, got {}",
                            other.type_name()
                        ))),
                    },
                }
            }
            Expr::Binary { op, lhs, rhs } => {
                let lhs = self.eval(lhs)?;
                let rhs = self.eval(rhs)?;
                self.eval_binary(*op, lhs, rhs)
            }
            Expr::Compare { op, lhs, rhs } => {
                let lhs = self.eval(lhs)?;
                let rhs = self.eval(rhs)?;
                self.eval_compare(*op, lhs, rhs)
            }
            Expr::And { lhs, rhs } => {
                // Short-circuit, returning the deciding operand.
                let lhs = self.eval(lhs)?;
                if lhs.is_truthy() {
                    self.eval(rhs)
                } else {
                    Ok(lhs)
                }
            }
            Expr::Or { lhs, rhs } => {
                let lhs = self.eval(lhs)?;
                if lhs.is_truthy() {
                    Ok(lhs)
                } else {
                    self.eval(rhs)
                }
            }
            Expr::IsNull { operand, negated } => {
                let value = self.eval(operand)?;
                let is_null = matches!(value, Value::Null);
                Ok(Value::Bool(is_null != *negated))
            }
            Expr::Ternary {
                cond,
                then,
                otherwise,
            } => {
                if self.eval(cond)?.is_truthy() {
                    self.eval(then)
                } else {
                    self.eval(otherwise)
                }
            }
            Expr::List(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval(item)?);
                }
                Ok(Value::List(values))
            }
            Expr::Map(items) => {
                let mut map = IndexMap::with_capacity(items.len());
                for (key, value) in items {
                    let key = match self.eval(key)? {
                        Value::Str(s) => s,
                        other => {
                            return Err(self.type_error(format!(
                                "map keys must be strings, got {}",
                                other.type_name()
                            )));
                        }
                    };
                    map.insert(key, self.eval(value)?);
                }
                Ok(Value::Map(map))
            }
        }
    }

    fn eval_index(&self, base: Value, index: Value) -> Result<Value, ExprError> {
        match (base, index) {
            (Value::List(items), Value::Int(i)) => {
                let len = items.len() as i64;
                let effective = if i < 0 { i + len } else { i };
                if effective < 0 || effective >= len {
                    return Err(self.type_error(format!(
                        "list index {} out of range (length {})",
                        i, len
                    )));
                }
                Ok(items[effective as usize].clone())
            }
            (Value::Map(map), Value::Str(key)) => map
                .get(&key)
                .cloned()
                .ok_or_else(|| self.type_error(format!("map has no key `{}`", key))),
            (base, index) => Err(self.type_error(format!(
                "cannot index {} with {}",
                base.type_name(),
                index.type_name()
            ))),
        }
    }

    fn eval_binary(&self, op: BinOp, lhs: Value, rhs: Value) -> Result<Value, ExprError> {
        use Value::{Float, Int, List, Str};

        match (op, &lhs, &rhs) {
            (BinOp::Add, Str(a), Str(b)) => {
                return Ok(Str(format!("{}{}", a, b)));
            }
            (BinOp::Add, List(a), List(b)) => {
                let mut out = a.clone();
                out.extend(b.iter().cloned());
                return Ok(List(out));
            }
            _ => {}
        }

        let type_mismatch = || {
            self.type_error(format!(
                "operator `{}` not supported between {} and {}",
                op.symbol(),
                lhs.type_name(),
                rhs.type_name()
            ))
        };

        match (&lhs, &rhs) {
            (Int(a), Int(b)) => {
                let (a, b) = (*a, *b);
                match op {
                    BinOp::Add => Ok(Int(a.wrapping_add(b))),
                    BinOp::Sub => Ok(Int(a.wrapping_sub(b))),
                    BinOp::Mul => Ok(Int(a.wrapping_mul(b))),
                    BinOp::Div => {
                        if b == 0 {
                            Err(self.type_error("division by zero"))
                        } else {
                            Ok(Float(a as f64 / b as f64))
                        }
                    }
                    BinOp::FloorDiv => {
                        if b == 0 {
                            Err(self.type_error("division by zero"))
                        } else {
                            Ok(Int(a.div_euclid(b)))
                        }
                    }
                    BinOp::Mod => {
                        if b == 0 {
                            Err(self.type_error("modulo by zero"))
                        } else {
                            Ok(Int(a.rem_euclid(b)))
                        }
                    }
                }
            }
            (Int(_) | Float(_), Int(_) | Float(_)) => {
                let a = as_f64(&lhs);
                let b = as_f64(&rhs);
                match op {
                    BinOp::Add => Ok(Float(a + b)),
                    BinOp::Sub => Ok(Float(a - b)),
                    BinOp::Mul => Ok(Float(a * b)),
                    BinOp::Div => {
                        if b == 0.0 {
                            Err(self.type_error("division by zero"))
                        } else {
                            Ok(Float(a / b))
                        }
                    }
                    BinOp::FloorDiv => {
                        if b == 0.0 {
                            Err(self.type_error("division by zero"))
                        } else {
                            Ok(Float((a / b).floor()))
                        }
                    }
                    BinOp::Mod => {
                        if b == 0.0 {
                            Err(self.type_error("modulo by zero"))
                        } else {
                            Ok(Float(a - b * (a / b).floor()))
                        }
                    }
                }
            }
            _ => Err(type_mismatch()),
        }
    }

    fn eval_compare(&self, op: CmpOp, lhs: Value, rhs: Value) -> Result<Value, ExprError> {
        match op {
            CmpOp::Eq => Ok(Value::Bool(loose_eq(&lhs, &rhs))),
            CmpOp::Ne => Ok(Value::Bool(!loose_eq(&lhs, &rhs))),
            CmpOp::In => self.eval_membership(&lhs, &rhs).map(Value::Bool),
            CmpOp::NotIn => self.eval_membership(&lhs, &rhs).map(|b| Value::Bool(!b)),
            CmpOp::Lt | CmpOp::Le | CmpOp::Gt | CmpOp::Ge => {
                let ordering = match (&lhs, &rhs) {
                    (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
                        as_f64(&lhs).partial_cmp(&as_f64(&rhs))
                    }
                    (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
                    _ => None,
                };
                let Some(ordering) = ordering else {
                    return Err(self.type_error(format!(
                        "operator `{}` not supported between {} and {}",
                        op.symbol(),
                        lhs.type_name(),
                        rhs.type_name()
                    )));
                };
                let result = match op {
                    CmpOp::Lt => ordering.is_lt(),
                    CmpOp::Le => ordering.is_le(),
                    CmpOp::Gt => ordering.is_gt(),
                    CmpOp::Ge => ordering.is_ge(),
                    _ => false,
                };
                Ok(Value::Bool(result))
            }
        }
    }

    fn eval_membership(&self, needle: &Value, haystack: &Value) -> Result<bool, ExprError> {
        match haystack {
            Value::List(items) => Ok(items.iter().any(|item| loose_eq(item, needle))),
            Value::Str(s) => match needle {
                Value::Str(sub) => Ok(s.contains(sub.as_str())),
                other => Err(self.type_error(format!(
                    "`in` on a string requires a string, got {}",
                    other.type_name()
                ))),
            },
            Value::Map(map) => match needle {
                Value::Str(key) => Ok(map.contains_key(key.as_str())),
                other => Err(self.type_error(format!(
                    "`in` on a map requires a string key, got {}",
                    other.type_name()
                ))),
            },
            other => Err(self.type_error(format!(
                "`in` requires a list, string, or map, got {}",
                other.type_name()
            ))),
        }
    }
}

fn as_f64(value: &Value) -> f64 {
    match value {
        Value::Int(i) => *i as f64,
        Value::Float(f) => *f,
        _ => f64::NAN,
    }
}

/// Equality with int/float cross-type comparison.
fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            as_f64(a) == as_f64(b)
        }
        _ => a == b,
    }
}
