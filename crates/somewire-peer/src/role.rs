use somewire_frame::{Frame, Header, HeaderBuilder};
use somewire_transport::Transport;

use crate::error::Result;
use crate::exchange::exchange;

/// Which side of an exchange a participant plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Calls methods and subscribes to events.
    Consumer,
    /// Offers a service: answers requests and emits events.
    Producer,
}

impl Role {
    pub fn name(self) -> &'static str {
        match self {
            Role::Consumer => "consumer",
            Role::Producer => "producer",
        }
    }
}

/// A participant identity associated with the transport it talks through.
///
/// Adds no wire behavior of its own.
#[derive(Debug)]
pub struct Participant<T> {
    role: Role,
    client_id: u16,
    transport: T,
}

impl<T> Participant<T> {
    pub fn new(role: Role, client_id: u16, transport: T) -> Self {
        Self {
            role,
            client_id,
            transport,
        }
    }

    pub fn consumer(client_id: u16, transport: T) -> Self {
        Self::new(Role::Consumer, client_id, transport)
    }

    pub fn producer(client_id: u16, transport: T) -> Self {
        Self::new(Role::Producer, client_id, transport)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn client_id(&self) -> u16 {
        self.client_id
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// A header builder pre-filled with this participant's client id.
    pub fn header(&self) -> HeaderBuilder {
        Header::builder().client_id(self.client_id.into())
    }
}

impl<T: Transport> Participant<T> {
    /// Send a request and wait for its reply, using the transport's default timeout.
    pub fn call(&mut self, request: &Frame) -> Result<Frame> {
        let timeout = self.transport.default_timeout();
        exchange(&mut self.transport, request, timeout)
    }
}
