use crate::data::ClusterId;

/// Narrative position of the graph: the overview or one focused cluster.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NarrativeStep {
    Overview,
    Focused(ClusterId),
}

impl NarrativeStep {
    /// Step 0 is the overview; step `k` focuses the cluster with id `k - 1`.
    pub fn from_index(step: usize) -> Self {
        match step {
            0 => Self::Overview,
            k => Self::Focused((k - 1) as ClusterId),
        }
    }

    pub fn index(self) -> usize {
        match self {
            Self::Overview => 0,
            Self::Focused(cluster_id) => usize::try_from(cluster_id).map_or(0, |id| id + 1),
        }
    }

    pub fn focused(self) -> Option<ClusterId> {
        match self {
            Self::Overview => None,
            Self::Focused(cluster_id) => Some(cluster_id),
        }
    }
}

pub fn total_steps(cluster_count: usize) -> usize {
    cluster_count + 1
}

pub fn clamp_step(step: usize, cluster_count: usize) -> usize {
    step.min(total_steps(cluster_count) - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_zero_is_the_overview() {
        assert_eq!(NarrativeStep::from_index(0), NarrativeStep::Overview);
        assert_eq!(NarrativeStep::Overview.focused(), None);
    }

    #[test]
    fn step_k_focuses_cluster_k_minus_one() {
        for k in 1..=6 {
            let step = NarrativeStep::from_index(k);
            assert_eq!(step.focused(), Some((k - 1) as ClusterId));
            assert_eq!(step.index(), k);
        }
    }

    #[test]
    fn steps_are_clamped_to_the_cluster_count() {
        assert_eq!(total_steps(5), 6);
        assert_eq!(clamp_step(9, 5), 5);
        assert_eq!(clamp_step(3, 5), 3);
        assert_eq!(clamp_step(4, 0), 0);
    }
}
