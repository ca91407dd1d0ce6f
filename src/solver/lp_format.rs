//! LP-format debug dump of a [`MipProblem`].
//!
//! The dialect is CPLEX LP with Gurobi's extensions: indicator rows use
//! `b = 1 -> ...` inside `Subject To`, and max constraints are listed under
//! `General Constraints` as `r = MAX ( ... )`.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use super::expr::{LinearExpr, VarHandle};
use super::problem::{ConstraintSpec, MipProblem, Sense, VarKind};

const TERMS_PER_LINE: usize = 8;

impl MipProblem {
    /// Writes the problem in LP format.
    pub fn write_lp<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "\\ Problem: {}", self.name())?;

        match self.objective() {
            Some(obj) => {
                let sense = match obj.sense {
                    Sense::Minimize => "Minimize",
                    Sense::Maximize => "Maximize",
                };
                writeln!(out, "{sense}")?;
                write!(out, " obj:")?;
                self.write_terms(out, &obj.expr)?;
                if obj.expr.constant_term() != 0.0 {
                    write!(out, " {}", signed(obj.expr.constant_term()))?;
                }
                writeln!(out)?;
            }
            None => {
                writeln!(out, "Minimize")?;
                writeln!(out, " obj: 0")?;
            }
        }

        writeln!(out, "Subject To")?;
        let (mut row, mut ind) = (0usize, 0usize);
        for c in self.constraints() {
            match c {
                ConstraintSpec::LinearEq { lhs, rhs } => {
                    write!(out, " R{row}:")?;
                    self.write_equation(out, lhs, rhs)?;
                    row += 1;
                }
                ConstraintSpec::Indicator {
                    indicator,
                    active_when,
                    lhs,
                    rhs,
                } => {
                    write!(
                        out,
                        " IC{ind}: {} = {} ->",
                        self.var_name(*indicator),
                        u8::from(*active_when)
                    )?;
                    self.write_equation(out, lhs, rhs)?;
                    ind += 1;
                }
                ConstraintSpec::Max { .. } => {}
            }
        }

        writeln!(out, "Bounds")?;
        for v in self.vars().iter().filter(|v| v.kind == VarKind::Integer) {
            writeln!(out, " {} <= {} <= {}", v.lower, v.name, v.upper)?;
        }

        for (header, kind) in [("Binaries", VarKind::Binary), ("Generals", VarKind::Integer)] {
            writeln!(out, "{header}")?;
            let names: Vec<&str> = self
                .vars()
                .iter()
                .filter(|v| v.kind == kind)
                .map(|v| v.name.as_str())
                .collect();
            for chunk in names.chunks(TERMS_PER_LINE) {
                writeln!(out, " {}", chunk.join(" "))?;
            }
        }

        let max_rows: Vec<_> = self
            .constraints()
            .iter()
            .filter_map(|c| match c {
                ConstraintSpec::Max { target, exprs } => Some((target, exprs)),
                _ => None,
            })
            .collect();
        if !max_rows.is_empty() {
            writeln!(out, "General Constraints")?;
            for (i, (target, exprs)) in max_rows.into_iter().enumerate() {
                let args: Vec<String> = exprs.iter().map(|e| self.render_operand(e)).collect();
                writeln!(
                    out,
                    " GC{i}: {} = MAX ( {} )",
                    self.var_name(*target),
                    args.join(" , ")
                )?;
            }
        }

        writeln!(out, "End")
    }

    /// Writes the LP dump to `path`, replacing any existing file.
    pub fn write_lp_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        self.write_lp(&mut out)?;
        out.flush()
    }

    fn var_name(&self, var: VarHandle) -> String {
        self.var(var)
            .map(|v| v.name.clone())
            .unwrap_or_else(|| var.to_string())
    }

    fn write_terms<W: Write>(&self, out: &mut W, expr: &LinearExpr) -> io::Result<()> {
        if expr.is_constant() {
            return write!(out, " 0");
        }
        for (i, &(var, coef)) in expr.terms().iter().enumerate() {
            if i > 0 && i % TERMS_PER_LINE == 0 {
                write!(out, "\n  ")?;
            }
            write!(out, " {}", self.render_term(var, coef))?;
        }
        Ok(())
    }

    /// `lhs = rhs` with every variable moved left and the constant right.
    fn write_equation<W: Write>(
        &self,
        out: &mut W,
        lhs: &LinearExpr,
        rhs: &LinearExpr,
    ) -> io::Result<()> {
        let diff = lhs.clone() - rhs.clone();
        self.write_terms(out, &diff)?;
        writeln!(out, " = {}", -diff.constant_term() + 0.0)
    }

    fn render_term(&self, var: VarHandle, coef: f64) -> String {
        let name = self.var_name(var);
        if coef == 1.0 {
            format!("+ {name}")
        } else if coef == -1.0 {
            format!("- {name}")
        } else {
            format!("{} {name}", signed(coef))
        }
    }

    fn render_operand(&self, expr: &LinearExpr) -> String {
        match expr.terms() {
            [] => format!("{}", expr.constant_term()),
            [(var, coef)] if *coef == 1.0 && expr.constant_term() == 0.0 => self.var_name(*var),
            _ => {
                let mut parts: Vec<String> = expr
                    .terms()
                    .iter()
                    .map(|&(v, c)| self.render_term(v, c))
                    .collect();
                if expr.constant_term() != 0.0 {
                    parts.push(signed(expr.constant_term()));
                }
                parts.join(" ")
            }
        }
    }
}

fn signed(value: f64) -> String {
    if value < 0.0 {
        format!("- {}", -value)
    } else {
        format!("+ {value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MipProblem {
        let mut p = MipProblem::new("sample");
        let s = p.add_binary("s[0,0]");
        let q0 = p.add_integer("q[0,0]", 0, 4);
        let q1 = p.add_integer("q[0,1]", 0, 4);
        let aux = p.add_integer("aux1[0,0]", -4, 4);
        let ind = p.add_binary("ind[0,0]");
        p.add_constraint(ConstraintSpec::LinearEq {
            lhs: aux.into(),
            rhs: q0 - 1.0,
        });
        p.add_constraint(ConstraintSpec::Max {
            target: ind,
            exprs: vec![LinearExpr::constant(0.0), aux.into()],
        });
        p.add_constraint(ConstraintSpec::Indicator {
            indicator: s,
            active_when: false,
            lhs: q1 - q0,
            rhs: LinearExpr::constant(1.0),
        });
        p.set_objective(LinearExpr::sum([q0, q1]), Sense::Minimize);
        p
    }

    fn render(p: &MipProblem) -> String {
        let mut buf = Vec::new();
        p.write_lp(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn writes_all_sections() {
        let text = render(&sample());
        assert!(text.starts_with("\\ Problem: sample\n"));
        assert!(text.contains("Minimize\n obj: + q[0,0] + q[0,1]\n"));
        assert!(text.contains(" R0: + aux1[0,0] - q[0,0] = -1\n"));
        assert!(text.contains(" IC0: s[0,0] = 0 -> + q[0,1] - q[0,0] = 1\n"));
        assert!(text.contains(" -4 <= aux1[0,0] <= 4\n"));
        assert!(text.contains("Binaries\n s[0,0] ind[0,0]\n"));
        assert!(text.contains("General Constraints\n GC0: ind[0,0] = MAX ( 0 , aux1[0,0] )\n"));
        assert!(text.trim_end().ends_with("End"));
    }

    #[test]
    fn long_objectives_wrap() {
        let mut p = MipProblem::new("wide");
        let vars: Vec<_> = (0..20)
            .map(|i| p.add_integer(&format!("x{i}"), 0, 1))
            .collect();
        p.set_objective(LinearExpr::sum(vars), Sense::Maximize);
        let text = render(&p);
        assert!(text.contains("Maximize\n"));
        let obj_lines = text
            .lines()
            .skip_while(|l| !l.starts_with(" obj:"))
            .take_while(|l| !l.starts_with("Subject To"))
            .count();
        assert_eq!(obj_lines, 3);
    }

    #[test]
    fn writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.lp");
        sample().write_lp_file(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("Subject To"));
    }
}
