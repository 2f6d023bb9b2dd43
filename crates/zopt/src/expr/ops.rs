//! Operator overloads over [`Expr`], [`Variable`] and `f64`.
//!
//! Every operator delegates to the named operation on [`Expr`]. Products of
//! two expressions are deliberately absent; use [`Expr::try_mul`] when one
//! side is only known to be constant at runtime.

use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::expr::core::Expr;
use crate::variable::Variable;

impl<T: Into<Expr>> Add<T> for Expr {
    type Output = Expr;
    fn add(self, rhs: T) -> Expr {
        let rhs: Expr = rhs.into();
        Expr::add(&self, &rhs)
    }
}

impl<T: Into<Expr>> Sub<T> for Expr {
    type Output = Expr;
    fn sub(self, rhs: T) -> Expr {
        let rhs: Expr = rhs.into();
        Expr::sub(&self, &rhs)
    }
}

impl<T: Into<Expr>> Add<T> for Variable {
    type Output = Expr;
    fn add(self, rhs: T) -> Expr {
        Expr::var(self) + rhs
    }
}

impl<T: Into<Expr>> Sub<T> for Variable {
    type Output = Expr;
    fn sub(self, rhs: T) -> Expr {
        Expr::var(self) - rhs
    }
}

impl Add<&Expr> for &Expr {
    type Output = Expr;
    fn add(self, rhs: &Expr) -> Expr {
        Expr::add(self, rhs)
    }
}

impl Sub<&Expr> for &Expr {
    type Output = Expr;
    fn sub(self, rhs: &Expr) -> Expr {
        Expr::sub(self, rhs)
    }
}

impl Add<Expr> for f64 {
    type Output = Expr;
    fn add(self, rhs: Expr) -> Expr {
        rhs.add_constant(self)
    }
}

impl Add<Variable> for f64 {
    type Output = Expr;
    fn add(self, rhs: Variable) -> Expr {
        Expr::var(rhs).add_constant(self)
    }
}

impl Sub<Expr> for f64 {
    type Output = Expr;
    fn sub(self, rhs: Expr) -> Expr {
        rhs.scale(-1.0).add_constant(self)
    }
}

impl Sub<Variable> for f64 {
    type Output = Expr;
    fn sub(self, rhs: Variable) -> Expr {
        Expr::term(rhs, -1.0).add_constant(self)
    }
}

impl Mul<f64> for Expr {
    type Output = Expr;
    fn mul(self, rhs: f64) -> Expr {
        self.scale(rhs)
    }
}

impl Mul<f64> for Variable {
    type Output = Expr;
    fn mul(self, rhs: f64) -> Expr {
        Expr::term(self, rhs)
    }
}

impl Mul<Expr> for f64 {
    type Output = Expr;
    fn mul(self, rhs: Expr) -> Expr {
        rhs.scale(self)
    }
}

impl Mul<Variable> for f64 {
    type Output = Expr;
    fn mul(self, rhs: Variable) -> Expr {
        Expr::term(rhs, self)
    }
}

impl Div<f64> for Expr {
    type Output = Expr;
    fn div(self, rhs: f64) -> Expr {
        self.scale(1.0 / rhs)
    }
}

impl Div<f64> for Variable {
    type Output = Expr;
    fn div(self, rhs: f64) -> Expr {
        Expr::term(self, 1.0 / rhs)
    }
}

impl Neg for Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        self.scale(-1.0)
    }
}

impl Neg for Variable {
    type Output = Expr;
    fn neg(self) -> Expr {
        Expr::term(self, -1.0)
    }
}

impl<T: Into<Expr>> AddAssign<T> for Expr {
    fn add_assign(&mut self, rhs: T) {
        let rhs: Expr = rhs.into();
        *self = Expr::add(self, &rhs);
    }
}

impl<T: Into<Expr>> SubAssign<T> for Expr {
    fn sub_assign(&mut self, rhs: T) {
        let rhs: Expr = rhs.into();
        *self = Expr::sub(self, &rhs);
    }
}

impl MulAssign<f64> for Expr {
    fn mul_assign(&mut self, rhs: f64) {
        *self = self.scale(rhs);
    }
}

impl Sum<Expr> for Expr {
    fn sum<I: Iterator<Item = Expr>>(iter: I) -> Expr {
        iter.fold(Expr::new(), |acc, e| Expr::add(&acc, &e))
    }
}

impl Sum<Variable> for Expr {
    fn sum<I: Iterator<Item = Variable>>(iter: I) -> Expr {
        Expr::from_terms(iter.map(|v| (v, 1.0)))
    }
}

impl<'a> Sum<&'a Expr> for Expr {
    fn sum<I: Iterator<Item = &'a Expr>>(iter: I) -> Expr {
        iter.fold(Expr::new(), |acc, e| Expr::add(&acc, e))
    }
}
