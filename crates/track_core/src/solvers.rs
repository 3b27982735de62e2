use crate::traits::{DynamicalSystem, Scalar, Steppable};

/// Classic fixed-step Runge-Kutta 4th order solver.
///
/// Stage buffers are allocated once and reused, so stepping a segment never allocates.
pub struct RK4<T: Scalar> {
    k1: Vec<T>,
    k2: Vec<T>,
    k3: Vec<T>,
    k4: Vec<T>,
    tmp: Vec<T>,
}

impl<T: Scalar> RK4<T> {
    pub fn new(dim: usize) -> Self {
        let z = T::zero();
        Self {
            k1: vec![z; dim],
            k2: vec![z; dim],
            k3: vec![z; dim],
            k4: vec![z; dim],
            tmp: vec![z; dim],
        }
    }

    pub fn dimension(&self) -> usize {
        self.tmp.len()
    }
}

impl<T: Scalar> Steppable<T> for RK4<T> {
    fn step(&mut self, system: &impl DynamicalSystem<T>, t: &mut T, state: &mut [T], dt: T) {
        debug_assert_eq!(state.len(), self.dimension());
        debug_assert_eq!(system.dimension(), self.dimension());

        let two = T::one() + T::one();
        let half_dt = dt / two;
        let sixth_dt = dt / (two + two + two);

        let t0 = *t;

        // k1 = f(t, y)
        system.apply(t0, state, &mut self.k1);

        // k2 = f(t + h/2, y + h/2 * k1)
        for i in 0..state.len() {
            self.tmp[i] = state[i] + half_dt * self.k1[i];
        }
        system.apply(t0 + half_dt, &self.tmp, &mut self.k2);

        // k3 = f(t + h/2, y + h/2 * k2)
        for i in 0..state.len() {
            self.tmp[i] = state[i] + half_dt * self.k2[i];
        }
        system.apply(t0 + half_dt, &self.tmp, &mut self.k3);

        // k4 = f(t + h, y + h * k3)
        for i in 0..state.len() {
            self.tmp[i] = state[i] + dt * self.k3[i];
        }
        system.apply(t0 + dt, &self.tmp, &mut self.k4);

        // y_next = y + h/6 * (k1 + 2k2 + 2k3 + k4)
        for i in 0..state.len() {
            state[i] = state[i]
                + sixth_dt * (self.k1[i] + two * self.k2[i] + two * self.k3[i] + self.k4[i]);
        }

        *t = t0 + dt;
    }
}

/// Advances `state` by one RK4 step without keeping solver buffers around.
///
/// Convenience for callers holding a fixed-size state; segment loops keep an [`RK4`]
/// instead.
pub fn rk4_step<S, const N: usize>(system: &S, t: f64, state: [f64; N], h: f64) -> [f64; N]
where
    S: DynamicalSystem<f64>,
{
    let mut solver = RK4::<f64>::new(N);
    let mut next = state;
    let mut time = t;
    solver.step(system, &mut time, &mut next[..], h);
    next
}
