use std::sync::Arc;

/// Handles datagrams received by the trigger listener.
pub trait TriggerHandler: Send + Sync + 'static {
    /// Handles one datagram payload. Implementations report their own
    /// failures and must not panic.
    fn handle(&self, payload: &[u8]);
}

impl<T> TriggerHandler for Arc<T>
where
    T: TriggerHandler + ?Sized,
{
    fn handle(&self, payload: &[u8]) {
        (**self).handle(payload);
    }
}
