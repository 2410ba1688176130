use crate::agents::{Agent, AgentId, AgentRole};
use crate::task::{Task, TaskId};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// One successful handoff made by an assignment pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub task_id: TaskId,
    pub agent_id: AgentId,
    pub role: AgentRole,
}

/// Ids of the pending tasks in the order an assignment pass attempts them:
/// priority descending, arrival order among equals (`sort_by_key` is stable).
pub fn assignment_order(pending: &[Task]) -> Vec<TaskId> {
    let mut ordered: Vec<&Task> = pending.iter().collect();
    ordered.sort_by_key(|task| Reverse(task.priority()));
    ordered.into_iter().map(Task::id).collect()
}

/// First agent in registry order that has the role and is idle.
pub fn find_idle_agent(agents: &[Agent], role: AgentRole) -> Option<usize> {
    agents
        .iter()
        .position(|agent| agent.role() == role && agent.is_idle())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::priority::TaskPriority;

    fn task(id: u64, priority: TaskPriority) -> Task {
        Task::new(id, format!("task-{id}"), priority, AgentRole::Reporting)
    }

    #[test]
    fn test_order_is_priority_descending() {
        let pending = vec![
            task(1, TaskPriority::Low),
            task(2, TaskPriority::High),
            task(3, TaskPriority::Medium),
        ];

        assert_eq!(assignment_order(&pending), vec![2, 3, 1]);
    }

    #[test]
    fn test_order_is_stable_for_equal_priorities() {
        let pending = vec![
            task(5, TaskPriority::Medium),
            task(1, TaskPriority::High),
            task(3, TaskPriority::Medium),
            task(2, TaskPriority::High),
            task(4, TaskPriority::Medium),
        ];

        assert_eq!(assignment_order(&pending), vec![1, 2, 5, 3, 4]);
    }

    #[test]
    fn test_find_idle_agent_skips_busy_and_wrong_role() {
        let mut busy = Agent::new(1, AgentRole::Reporting);
        busy.assign(task(10, TaskPriority::Low)).unwrap();
        let agents = vec![
            busy,
            Agent::new(2, AgentRole::Security),
            Agent::new(3, AgentRole::Reporting),
            Agent::new(4, AgentRole::Reporting),
        ];

        assert_eq!(find_idle_agent(&agents, AgentRole::Reporting), Some(2));
        assert_eq!(find_idle_agent(&agents, AgentRole::Monitoring), None);
    }
}
