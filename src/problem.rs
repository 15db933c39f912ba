use crate::error::CpError;
use crate::util::EPS;

use std::collections::{HashMap, HashSet};

const EQ_STR: &str = "\u{003D}";

/// An LP instance with non-negative variables and equality constraints only,
/// which is the shape every complementary problem takes: coverage rows, an
/// optional aggregation row, and the normalization row.
#[derive(Debug, Clone, Default)]
pub struct Problem {
    pub variables: Vec<Variable>,
    pub constraints: Vec<Constraint>,
    var_names: HashSet<String>, //these strings are duplicated in the variables
    var_ids: HashSet<VariableId>,
}

impl Problem {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add_var(&mut self, obj_coeff: f64, name: Option<String>) -> Result<VariableId, CpError> {
        if !obj_coeff.is_finite() {
            return Err(CpError::Construction(format!(
                "invalid objective coefficient: {}",
                obj_coeff
            )));
        }

        if let Some(name) = &name {
            if !self.var_names.insert(name.clone()) {
                return Err(CpError::Construction(format!(
                    "variable names must be unique, {} was added twice",
                    name
                )));
            }
        }

        let id = VariableId(self.variables.len());
        self.variables.push(Variable::new(id, obj_coeff, name));
        assert!(self.var_ids.insert(id));
        Ok(id)
    }

    pub fn set_obj_coeff(&mut self, id: VariableId, obj_coeff: f64) -> Result<(), CpError> {
        match self.variables.get_mut(id.0) {
            Some(var) => {
                var.obj_coeff = obj_coeff;
                Ok(())
            }

            None => Err(CpError::Construction(format!("{:?} is invalid", id))),
        }
    }

    /// Adds the equality constraint `coeffs . x = rhs`.
    pub fn add_constraint(
        &mut self,
        coeffs: Vec<(VariableId, f64)>,
        rhs: f64,
    ) -> Result<(), CpError> {
        match coeffs
            .iter()
            .find(|(id, _coeff)| !self.var_ids.contains(id))
        {
            Some((invalid_var, _coeff)) => Err(CpError::Construction(format!(
                "{:?} is invalid",
                invalid_var
            ))),

            None => {
                self.constraints.push(Constraint { coeffs, rhs });
                Ok(())
            }
        }
    }

    pub fn constraints(&self) -> &[Constraint] {
        self.constraints.as_slice()
    }

    pub fn is_feasible(&self, x: &[f64]) -> bool {
        if x.len() != self.variables.len() {
            return false;
        }

        if x.iter().any(|&x_i| x_i < -EPS) {
            return false;
        }

        self.constraints.iter().all(|c| c.is_feasible(x))
    }
}

#[derive(Debug, Clone)]
pub struct Variable {
    pub id: VariableId,
    pub obj_coeff: f64,
    pub name: Option<String>,
}

impl Variable {
    fn new(id: VariableId, obj_coeff: f64, name: Option<String>) -> Self {
        Self {
            id,
            obj_coeff,
            name,
        }
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        //Problem add_var guarantees that different variables have different ids
        self.id == other.id
    }
}

impl Eq for Variable {}

impl std::hash::Hash for Variable {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[derive(Debug, Clone)]
pub struct Constraint {
    pub coeffs: Vec<(VariableId, f64)>,
    pub rhs: f64,
}

impl Constraint {
    fn is_feasible(&self, x: &[f64]) -> bool {
        let mut lhs = 0.;

        for (var, coeff) in &self.coeffs {
            let i: usize = var.into();
            lhs += coeff * x[i];
        }

        (lhs - self.rhs).abs() < EPS
    }

    fn display(
        &self,
        f: &mut std::fmt::Formatter,
        vars: &HashMap<VariableId, &Variable>,
    ) -> std::fmt::Result {
        for (var_id, coeff) in &self.coeffs {
            if *coeff == 0. {
                continue;
            }

            let var = *vars.get(var_id).unwrap();

            write!(
                f,
                "{} {} {} ",
                if *coeff >= 0. { "+" } else { "-" },
                coeff.abs(),
                var
            )?;
        }

        write!(f, "{} {}", EQ_STR, self.rhs)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct VariableId(usize);

impl std::convert::From<usize> for VariableId {
    fn from(id: usize) -> Self {
        Self(id)
    }
}

impl std::convert::From<VariableId> for usize {
    fn from(id: VariableId) -> Self {
        id.0
    }
}

impl std::convert::From<&VariableId> for usize {
    fn from(id: &VariableId) -> Self {
        id.0
    }
}

impl std::fmt::Display for Problem {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "minimize")?;
        let mut var_id_to_var: HashMap<VariableId, &Variable> = HashMap::new();

        for var in &self.variables {
            let result = var_id_to_var.insert(var.id, var);
            assert!(result.is_none()); //should not have repeated ids

            if var.obj_coeff == 0. {
                continue;
            }

            write!(
                f,
                "{} {} {} ",
                if var.obj_coeff > 0. { "+" } else { "-" },
                var.obj_coeff.abs(),
                var
            )?;
        }

        writeln!(f, "\n\nsubject to")?;

        for constraint in &self.constraints {
            constraint.display(f, &var_id_to_var)?;
            writeln!(f)?;
        }

        writeln!(f, "\nwith all variables non-negative")
    }
}

impl std::fmt::Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "id[{}]", self.id.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Problem, VariableId};

    #[test]
    fn add_var() {
        let mut prob = Problem::new();
        prob.add_var(1., Some("x".to_string())).unwrap();
        assert_eq!(prob.variables[0].name.as_ref().unwrap(), "x");
    }

    #[test]
    fn add_var_bad_obj_coeff() {
        let mut prob = Problem::new();
        assert!(prob.add_var(f64::NAN, Some("x".to_string())).is_err());
    }

    #[test]
    fn add_constraint() {
        let mut prob = Problem::new();
        let var_id = prob.add_var(1., None).unwrap();
        assert!(prob.add_constraint(vec![(var_id, 1.)], 0.).is_ok());
    }

    #[test]
    fn add_constraint_invalid_var() {
        let mut prob = Problem::new();
        assert!(prob
            .add_constraint(vec![(VariableId(0), 1.)], 0.)
            .is_err());
    }

    #[test]
    fn nonunique_var_names() {
        let mut prob = Problem::new();
        prob.add_var(0., Some("x".to_string())).unwrap();

        let is_err = prob.add_var(0., Some("x".to_string())).is_err();

        assert!(is_err);
    }

    #[test]
    fn set_obj_coeff() {
        let mut prob = Problem::new();
        let var_id = prob.add_var(0., None).unwrap();
        prob.set_obj_coeff(var_id, 5.).unwrap();
        assert_eq!(prob.variables[0].obj_coeff, 5.);
        assert!(prob.set_obj_coeff(VariableId(1), 5.).is_err());
    }

    #[test]
    fn feasibility() {
        let mut prob = Problem::new();
        let x = prob.add_var(1., None).unwrap();
        let y = prob.add_var(1., None).unwrap();
        prob.add_constraint(vec![(x, 1.), (y, 1.)], 1.).unwrap();

        assert!(prob.is_feasible(&[0.5, 0.5]));
        assert!(!prob.is_feasible(&[1., 1.]));
        assert!(!prob.is_feasible(&[1.5, -0.5]));
        assert!(!prob.is_feasible(&[1.]));
    }
}
