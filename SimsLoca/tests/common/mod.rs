//! In-memory DBPF fixtures shared by the integration tests

#![allow(dead_code)]

use std::io::Write;

use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use flate2::Compression;
use flate2::write::ZlibEncoder;

use simsloca::formats::stbl::{LocalizationTable, STBL_RESOURCE_TYPE, TableEntry, encode_stbl};
use simsloca::package::{
    CODEC_DEFLATE, CODEC_REFPACK_CURRENT, CODEC_STORED, HEADER_SIZE, ResourceKey,
    SIZE_COMPRESSED_FLAG,
};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// How a fixture resource is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    /// No codec field in the index record
    Plain,
    /// Codec field present with the given id; payload stored as given
    Raw(u16),
    /// Codec field `0x0000`
    Stored,
    /// Zlib payload, codec `0x5A42`
    Zlib,
    /// Literal-only RefPack payload, codec `0xFFFE`
    RefPack,
}

struct Resource {
    key: ResourceKey,
    payload: Vec<u8>,
    decompressed_size: u32,
    codec: Option<u16>,
}

/// Builds a DBPF 2.1 package: header, payloads, then the index
#[derive(Default)]
pub struct PackageBuilder {
    constant_type: Option<u32>,
    resources: Vec<Resource>,
}

impl PackageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the resource type constant for the whole index
    pub fn constant_type(mut self, resource_type: u32) -> Self {
        self.constant_type = Some(resource_type);
        self
    }

    pub fn resource(mut self, key: ResourceKey, data: &[u8], storage: Storage) -> Self {
        let (payload, codec) = match storage {
            Storage::Plain => (data.to_vec(), None),
            Storage::Raw(id) => (data.to_vec(), Some(id)),
            Storage::Stored => (data.to_vec(), Some(CODEC_STORED)),
            Storage::Zlib => (zlib(data), Some(CODEC_DEFLATE)),
            Storage::RefPack => (refpack_literals(data), Some(CODEC_REFPACK_CURRENT)),
        };
        self.resources.push(Resource {
            key,
            payload,
            decompressed_size: data.len() as u32,
            codec,
        });
        self
    }

    pub fn stbl(self, instance: u64, rows: &[(u32, &str)], storage: Storage) -> Self {
        let key = ResourceKey::new(STBL_RESOURCE_TYPE, 0, instance);
        self.resource(key, &stbl_bytes(rows), storage)
    }

    pub fn build(&self) -> Vec<u8> {
        let mut body = Vec::new();
        let mut offsets = Vec::new();
        for resource in &self.resources {
            offsets.push((HEADER_SIZE + body.len()) as u32);
            body.extend_from_slice(&resource.payload);
        }

        let mut index = Vec::new();
        match self.constant_type {
            Some(resource_type) => {
                index.write_u32::<LittleEndian>(1).unwrap();
                index.write_u32::<LittleEndian>(resource_type).unwrap();
            }
            None => index.write_u32::<LittleEndian>(0).unwrap(),
        }

        for (resource, offset) in self.resources.iter().zip(&offsets) {
            if self.constant_type.is_none() {
                index.write_u32::<LittleEndian>(resource.key.resource_type).unwrap();
            }
            index.write_u32::<LittleEndian>(resource.key.group).unwrap();
            index.write_u32::<LittleEndian>((resource.key.instance >> 32) as u32).unwrap();
            index.write_u32::<LittleEndian>(resource.key.instance as u32).unwrap();
            index.write_u32::<LittleEndian>(*offset).unwrap();

            let size = resource.payload.len() as u32;
            if let Some(codec) = resource.codec {
                index.write_u32::<LittleEndian>(size | SIZE_COMPRESSED_FLAG).unwrap();
                index.write_u32::<LittleEndian>(resource.decompressed_size).unwrap();
                index.write_u16::<LittleEndian>(codec).unwrap();
                index.write_u16::<LittleEndian>(1).unwrap();
            } else {
                index.write_u32::<LittleEndian>(size).unwrap();
                index.write_u32::<LittleEndian>(resource.decompressed_size).unwrap();
            }
        }

        let mut data = header(
            self.resources.len() as u32,
            (HEADER_SIZE + body.len()) as u32,
            index.len() as u32,
        );
        data.extend_from_slice(&body);
        data.extend_from_slice(&index);
        data
    }
}

/// A 96-byte DBPF 2.1 header
pub fn header(index_count: u32, index_offset: u32, index_size: u32) -> Vec<u8> {
    let mut data = Vec::with_capacity(HEADER_SIZE);
    data.extend_from_slice(b"DBPF");
    for value in [2u32, 1, 0, 0, 0, 0, 0, 0, index_count, index_offset, index_size] {
        data.write_u32::<LittleEndian>(value).unwrap();
    }
    data.resize(HEADER_SIZE, 0);
    data
}

pub fn stbl_bytes(rows: &[(u32, &str)]) -> Vec<u8> {
    let table = LocalizationTable::from_entries(rows.iter().map(|&(k, t)| TableEntry::new(k, t)));
    encode_stbl(&table).unwrap()
}

pub fn zlib(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Encode `data` as a RefPack stream using literal opcodes only
pub fn refpack_literals(data: &[u8]) -> Vec<u8> {
    let mut out = vec![0x10, 0xFB];
    out.write_u24::<BigEndian>(data.len() as u32).unwrap();

    let mut rest = data;
    while rest.len() >= 4 {
        let run = (rest.len() / 4 * 4).min(112);
        out.push(0xE0 + (run / 4 - 1) as u8);
        out.extend_from_slice(&rest[..run]);
        rest = &rest[run..];
    }
    out.push(0xFC + rest.len() as u8);
    out.extend_from_slice(rest);
    out
}
