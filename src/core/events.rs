use crate::core::BodyHandle;
use crate::math::Vector2;
use std::collections::VecDeque;

/// Types of collision events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionEventType {
    /// Bodies have just started touching; an arbiter was created
    Begin,

    /// Bodies have just stopped touching; their arbiter was removed
    End,
}

/// A collision event between two bodies
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionEvent {
    /// The type of collision event
    pub event_type: CollisionEventType,

    /// The body with the lower handle
    pub body_a: BodyHandle,

    /// The body with the higher handle
    pub body_b: BodyHandle,

    /// Contact positions at the time of the event (empty for End events)
    pub contacts: Vec<Vector2>,
}

/// Types of body events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEventType {
    /// A body has been added to the world
    Added,

    /// A body has been removed from the world
    Removed,
}

/// An event related to a single body
#[derive(Debug, Clone, PartialEq)]
pub struct BodyEvent {
    /// The type of body event
    pub event_type: BodyEventType,

    /// The body that the event refers to
    pub body: BodyHandle,
}

/// A queue of physics events
#[derive(Debug, Default)]
pub struct EventQueue {
    /// Collision events
    collision_events: VecDeque<CollisionEvent>,

    /// Body events
    body_events: VecDeque<BodyEvent>,
}

impl EventQueue {
    /// Creates a new empty event queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a collision event to the queue
    pub fn add_collision_event(&mut self, event: CollisionEvent) {
        self.collision_events.push_back(event);
    }

    /// Adds a body event to the queue
    pub fn add_body_event(&mut self, event: BodyEvent) {
        self.body_events.push_back(event);
    }

    /// Gets the next collision event from the queue
    pub fn next_collision_event(&mut self) -> Option<CollisionEvent> {
        self.collision_events.pop_front()
    }

    /// Gets the next body event from the queue
    pub fn next_body_event(&mut self) -> Option<BodyEvent> {
        self.body_events.pop_front()
    }

    /// Returns whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.collision_events.is_empty() && self.body_events.is_empty()
    }

    /// Clears all events from the queue
    pub fn clear(&mut self) {
        self.collision_events.clear();
        self.body_events.clear();
    }

    /// Gets all collision events of a specific type
    pub fn get_collision_events_of_type(&self, event_type: CollisionEventType) -> Vec<&CollisionEvent> {
        self.collision_events
            .iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    /// Gets all collision events involving a specific body
    pub fn get_collision_events_for_body(&self, body: BodyHandle) -> Vec<&CollisionEvent> {
        self.collision_events
            .iter()
            .filter(|e| e.body_a == body || e.body_b == body)
            .collect()
    }

    /// Gets all body events of a specific type
    pub fn get_body_events_of_type(&self, event_type: BodyEventType) -> Vec<&BodyEvent> {
        self.body_events
            .iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }
}
