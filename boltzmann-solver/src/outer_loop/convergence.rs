use serde::{Deserialize, Serialize};

/// Tolerances and iteration caps of the nested loops
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Convergence {
    pub outer_tolerance: f64,
    pub inner_tolerance: f64,
    pub maximum_outer_iterations: usize,
    pub maximum_inner_iterations: usize,
}

impl Convergence {
    pub fn outer_tolerance(&self) -> f64 {
        self.outer_tolerance
    }

    pub fn inner_tolerance(&self) -> f64 {
        self.inner_tolerance
    }

    pub fn maximum_outer_iterations(&self) -> usize {
        self.maximum_outer_iterations
    }

    pub fn maximum_inner_iterations(&self) -> usize {
        self.maximum_inner_iterations
    }
}

/// How a loop ended
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopStatus {
    pub iterations: usize,
    pub converged: bool,
}

/// A fixed set of scalars, each remembered with its previous value
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ScalarSet<const N: usize> {
    previous: [f64; N],
    current: [f64; N],
}

impl<const N: usize> ScalarSet<N> {
    pub(crate) fn new(initial: [f64; N]) -> Self {
        Self {
            previous: initial,
            current: initial,
        }
    }

    pub(crate) fn update(&mut self, values: [f64; N]) {
        self.previous = std::mem::replace(&mut self.current, values);
    }

    pub(crate) fn current(&self) -> &[f64; N] {
        &self.current
    }

    /// True when every scalar moved by less than `tolerance` in the last update
    pub(crate) fn is_within_tolerance(&self, tolerance: f64) -> bool {
        self.previous
            .iter()
            .zip(self.current.iter())
            .all(|(previous, current)| (current - previous).abs() < tolerance)
    }
}

/// Runs `single_iteration` until the scalars it returns settle or `maximum_iterations`
/// passes have been made.
///
/// `scalars` must hold the values before the first pass.
pub(crate) fn iterate_to_convergence<const N: usize, E>(
    scalars: &mut ScalarSet<N>,
    tolerance: f64,
    maximum_iterations: usize,
    mut single_iteration: impl FnMut(usize) -> Result<[f64; N], E>,
) -> Result<LoopStatus, E> {
    for iteration in 1..=maximum_iterations {
        scalars.update(single_iteration(iteration)?);
        if scalars.is_within_tolerance(tolerance) {
            return Ok(LoopStatus {
                iterations: iteration,
                converged: true,
            });
        }
    }
    Ok(LoopStatus {
        iterations: maximum_iterations,
        converged: false,
    })
}

#[cfg(test)]
mod test {
    use super::{iterate_to_convergence, ScalarSet};

    #[test]
    fn loop_halts_when_all_scalars_pass_together() {
        // the first scalar settles after two passes, the second after four
        let sequence = [[1., 10.], [1.5, 5.], [1.5, 2.], [1.5, 1.], [1.5, 1.], [1.5, 1.]];
        let mut scalars = ScalarSet::new([0., 20.]);
        let status = iterate_to_convergence(&mut scalars, 1e-3, 10, |iteration| {
            Ok::<_, ()>(sequence[iteration - 1])
        })
        .unwrap();
        assert!(status.converged);
        assert_eq!(status.iterations, 5);
        assert_eq!(scalars.current(), &[1.5, 1.]);
    }

    #[test]
    fn slow_scalar_holds_the_loop_open() {
        let mut scalars = ScalarSet::new([0., 0.]);
        let status = iterate_to_convergence(&mut scalars, 1e-3, 7, |iteration| {
            Ok::<_, ()>([0., iteration as f64])
        })
        .unwrap();
        assert!(!status.converged);
        assert_eq!(status.iterations, 7);
    }

    #[test]
    fn zero_iterations_leave_the_scalars_untouched() {
        let mut scalars = ScalarSet::new([3.]);
        let status =
            iterate_to_convergence(&mut scalars, 1., 0, |_| Ok::<_, ()>([100.])).unwrap();
        assert!(!status.converged);
        assert_eq!(status.iterations, 0);
        assert_eq!(scalars.current(), &[3.]);
    }

    #[test]
    fn errors_stop_the_loop() {
        let mut scalars = ScalarSet::new([0.]);
        let result = iterate_to_convergence(&mut scalars, 1., 5, |iteration| match iteration {
            3 => Err("failed"),
            _ => Ok([iteration as f64 * 10.]),
        });
        assert_eq!(result, Err("failed"));
    }
}
