//! Per-`(user, timestep)` variable grids.

use std::fmt;

use crate::solver::VarHandle;

/// The six variable families of the formulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarFamily {
    /// `s[n,t]`: user served at `t`.
    Scheduled,
    /// `l[n,t]`: cumulative packet loss.
    Loss,
    /// `q[n,t]`: buffer occupancy.
    Occupancy,
    /// `ind[n,t]`: buffer overflowed.
    Overflow,
    /// `aux1[n,t]`: occupancy minus capacity.
    Margin,
    /// `aux2[n,t]`: declared for reporting, never constrained.
    Reserved,
}

impl VarFamily {
    /// Declaration order for each `(n, t)`.
    pub const ALL: [VarFamily; 6] = [
        VarFamily::Scheduled,
        VarFamily::Loss,
        VarFamily::Occupancy,
        VarFamily::Overflow,
        VarFamily::Margin,
        VarFamily::Reserved,
    ];

    pub const fn prefix(&self) -> &'static str {
        match self {
            VarFamily::Scheduled => "s",
            VarFamily::Loss => "l",
            VarFamily::Occupancy => "q",
            VarFamily::Overflow => "ind",
            VarFamily::Margin => "aux1",
            VarFamily::Reserved => "aux2",
        }
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, VarFamily::Scheduled | VarFamily::Overflow)
    }

    /// Variable name, e.g. `q[1,3]`.
    pub fn name(&self, user: usize, t: usize) -> String {
        format!("{}[{user},{t}]", self.prefix())
    }
}

impl fmt::Display for VarFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Handles of one family, indexed by `(user, timestep)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarGrid {
    steps: usize,
    handles: Vec<VarHandle>,
}

impl VarGrid {
    pub(crate) fn with_capacity(users: usize, steps: usize) -> Self {
        Self {
            steps,
            handles: Vec::with_capacity(users * steps),
        }
    }

    /// Appends the next handle in user-major order.
    pub(crate) fn push(&mut self, handle: VarHandle) {
        self.handles.push(handle);
    }

    pub fn get(&self, user: usize, t: usize) -> Option<VarHandle> {
        if t >= self.steps {
            return None;
        }
        self.handles.get(user * self.steps + t).copied()
    }

    /// All timesteps of one user.
    pub fn row(&self, user: usize) -> &[VarHandle] {
        let start = (user * self.steps).min(self.handles.len());
        let end = (start + self.steps).min(self.handles.len());
        &self.handles[start..end]
    }

    /// One timestep across all users, in user order.
    pub fn column(&self, t: usize) -> impl Iterator<Item = VarHandle> + '_ {
        let start = if t < self.steps { t } else { self.handles.len() };
        self.handles[start..]
            .iter()
            .step_by(self.steps.max(1))
            .copied()
    }

    pub fn users(&self) -> usize {
        if self.steps == 0 {
            0
        } else {
            self.handles.len() / self.steps
        }
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn iter(&self) -> impl Iterator<Item = VarHandle> + '_ {
        self.handles.iter().copied()
    }
}

/// Every variable of a built model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleVariables {
    pub scheduled: VarGrid,
    pub loss: VarGrid,
    pub occupancy: VarGrid,
    pub overflow: VarGrid,
    pub margin: VarGrid,
    pub reserved: VarGrid,
}

impl ScheduleVariables {
    pub(crate) fn with_capacity(users: usize, steps: usize) -> Self {
        let grid = || VarGrid::with_capacity(users, steps);
        Self {
            scheduled: grid(),
            loss: grid(),
            occupancy: grid(),
            overflow: grid(),
            margin: grid(),
            reserved: grid(),
        }
    }

    pub fn family(&self, family: VarFamily) -> &VarGrid {
        match family {
            VarFamily::Scheduled => &self.scheduled,
            VarFamily::Loss => &self.loss,
            VarFamily::Occupancy => &self.occupancy,
            VarFamily::Overflow => &self.overflow,
            VarFamily::Margin => &self.margin,
            VarFamily::Reserved => &self.reserved,
        }
    }

    pub(crate) fn family_mut(&mut self, family: VarFamily) -> &mut VarGrid {
        match family {
            VarFamily::Scheduled => &mut self.scheduled,
            VarFamily::Loss => &mut self.loss,
            VarFamily::Occupancy => &mut self.occupancy,
            VarFamily::Overflow => &mut self.overflow,
            VarFamily::Margin => &mut self.margin,
            VarFamily::Reserved => &mut self.reserved,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(users: usize, steps: usize) -> VarGrid {
        let mut g = VarGrid::with_capacity(users, steps);
        for i in 0..users * steps {
            g.push(VarHandle(i));
        }
        g
    }

    #[test]
    fn names() {
        assert_eq!(VarFamily::Scheduled.name(0, 1), "s[0,1]");
        assert_eq!(VarFamily::Margin.name(2, 0), "aux1[2,0]");
        assert_eq!(VarFamily::Reserved.name(2, 0), "aux2[2,0]");
        assert!(VarFamily::Overflow.is_binary());
        assert!(!VarFamily::Loss.is_binary());
    }

    #[test]
    fn grid_indexing() {
        let g = grid(2, 3);
        assert_eq!(g.users(), 2);
        assert_eq!(g.get(1, 2), Some(VarHandle(5)));
        assert_eq!(g.get(0, 3), None);
        assert_eq!(g.get(2, 0), None);
        assert_eq!(g.row(1), &[VarHandle(3), VarHandle(4), VarHandle(5)]);
        assert!(g.row(5).is_empty());
        let col: Vec<_> = g.column(1).collect();
        assert_eq!(col, vec![VarHandle(1), VarHandle(4)]);
        assert_eq!(g.column(2).collect::<Vec<_>>(), vec![VarHandle(2), VarHandle(5)]);
        assert_eq!(g.column(3).count(), 0);
        assert_eq!(VarGrid::with_capacity(0, 0).column(0).count(), 0);
    }

    #[test]
    fn columns_visit_only_their_timestep() {
        let g = grid(50, 40);
        for t in [0, 17, 39] {
            let col: Vec<_> = g.column(t).collect();
            assert_eq!(col.len(), 50);
            assert!(col.iter().enumerate().all(|(n, h)| h.index() == n * 40 + t));
        }
    }

    #[test]
    fn family_lookup() {
        let mut vars = ScheduleVariables::with_capacity(1, 1);
        vars.family_mut(VarFamily::Loss).push(VarHandle(9));
        assert_eq!(vars.family(VarFamily::Loss).get(0, 0), Some(VarHandle(9)));
        assert_eq!(vars.loss.get(0, 0), Some(VarHandle(9)));
        assert_eq!(vars.scheduled.get(0, 0), None);
    }
}
