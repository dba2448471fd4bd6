use crate::codec::{
    CodecError, WireObject, WireReader, WireWriter,
    registry::{WireObjectFactory, factory_id},
};
use std::any::Any;

///
/// Cluster request type ids.
///

pub mod cluster_type {
    pub const PING: i32 = 1;
}

///
/// PingRequest
///
/// Zero-body request used to hold a connection open. Writes and reads no
/// bytes; the tag pair is the entire payload.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PingRequest;

impl WireObject for PingRequest {
    fn factory_id(&self) -> i32 {
        factory_id::CLUSTER
    }

    fn type_id(&self) -> i32 {
        cluster_type::PING
    }

    fn write_to(&self, _writer: &mut WireWriter) -> Result<(), CodecError> {
        Ok(())
    }

    fn read_from(&mut self, _reader: &mut WireReader<'_>) -> Result<(), CodecError> {
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

///
/// ClusterFactory
///

#[derive(Clone, Copy, Debug, Default)]
pub struct ClusterFactory;

impl WireObjectFactory for ClusterFactory {
    fn create(&self, type_id: i32) -> Option<Box<dyn WireObject>> {
        (type_id == cluster_type::PING).then(|| Box::new(PingRequest) as Box<dyn WireObject>)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::PingRequest;
    use crate::codec::{deserialize_object, registry::FactoryRegistry, serialize_object};

    #[test]
    fn ping_is_only_its_tag_pair() {
        let bytes = serialize_object(&PingRequest).expect("ping should serialize");
        // presence marker + factory id + type id, nothing else
        assert_eq!(bytes.len(), 1 + 4 + 4);
    }

    #[test]
    fn ping_round_trips() {
        let registry = FactoryRegistry::with_defaults();
        let bytes = serialize_object(&PingRequest).expect("ping should serialize");
        let decoded = deserialize_object(&bytes, &registry)
            .expect("ping should deserialize")
            .expect("ping should be present");
        let ping = decoded
            .into_any()
            .downcast::<PingRequest>()
            .expect("decoded object should be a ping");
        assert_eq!(*ping, PingRequest);
    }
}
