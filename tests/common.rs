#![allow(dead_code)]

use grpc_validate::{Field, Record, validatable};
use tonic::Status;
use tonic_types::StatusExt;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct HelloRequest {
    pub name: String,
}

impl Record for HelloRequest {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![Field::new("Name", &self.name).rules("required")]
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct HelloReply {
    pub message: String,
}

validatable!(HelloRequest);

pub fn hello(name: &str) -> HelloRequest {
    HelloRequest { name: name.into() }
}

/// Field names of the `BadRequest` violations carried by `status`.
pub fn violation_fields(status: &Status) -> Vec<String> {
    status
        .get_details_bad_request()
        .expect("status carries a BadRequest detail")
        .field_violations
        .into_iter()
        .map(|v| v.field)
        .collect()
}
