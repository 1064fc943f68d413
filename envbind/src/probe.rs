//! Compile-time capability detection used by `#[derive(EnvBind)]`.
//!
//! Each capability comes as a pair of traits with the same method name. The
//! "found" trait is implemented for `Probe<T>` when `T` has the capability;
//! the fallback is implemented for `&Probe<T>` unconditionally. Calling the
//! method on `&Probe<T>` resolves to the found impl whenever it applies,
//! because method lookup tries the receiver type before adding another
//! reference.
//!
//! This only works for concrete types, which is what the derive expands to.

use std::marker::PhantomData;

use crate::binder::Binder;
use crate::capability::{CoerceFn, DecodeFn, ScanFn, UnmarshalFn};
use crate::capability::{Scan, UnmarshalJson, UnmarshalText};
use crate::coerce::{json_sequence, scan_sequence, text_sequence, Coerce};
use crate::error::BindError;
use crate::EnvBind;

pub type NestedFn<T> = fn(&mut T, &Binder<'_>) -> Result<(), BindError>;

pub struct Probe<T>(PhantomData<fn() -> T>);

impl<T> Probe<T> {
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for Probe<T> {
    fn default() -> Self {
        Self::new()
    }
}

pub trait NestedProbe {
    type Value;

    fn nested_capability(&self) -> Option<NestedFn<Self::Value>>;
}

impl<T: EnvBind> NestedProbe for Probe<T> {
    type Value = T;

    fn nested_capability(&self) -> Option<NestedFn<T>> {
        Some(T::bind_fields as NestedFn<T>)
    }
}

pub trait NoNested {
    type Value;

    fn nested_capability(&self) -> Option<NestedFn<Self::Value>>;
}

impl<T> NoNested for &Probe<T> {
    type Value = T;

    fn nested_capability(&self) -> Option<NestedFn<T>> {
        None
    }
}

pub trait ScanProbe {
    type Value;

    fn scan_capability(&self) -> Option<ScanFn<Self::Value>>;
}

impl<T: Scan> ScanProbe for Probe<T> {
    type Value = T;

    fn scan_capability(&self) -> Option<ScanFn<T>> {
        Some(T::scan as ScanFn<T>)
    }
}

pub trait NoScan {
    type Value;

    fn scan_capability(&self) -> Option<ScanFn<Self::Value>>;
}

impl<T> NoScan for &Probe<T> {
    type Value = T;

    fn scan_capability(&self) -> Option<ScanFn<T>> {
        None
    }
}

pub trait TextProbe {
    type Value;

    fn text_capability(&self) -> Option<UnmarshalFn<Self::Value>>;
}

impl<T: UnmarshalText> TextProbe for Probe<T> {
    type Value = T;

    fn text_capability(&self) -> Option<UnmarshalFn<T>> {
        Some(T::unmarshal_text as UnmarshalFn<T>)
    }
}

pub trait NoText {
    type Value;

    fn text_capability(&self) -> Option<UnmarshalFn<Self::Value>>;
}

impl<T> NoText for &Probe<T> {
    type Value = T;

    fn text_capability(&self) -> Option<UnmarshalFn<T>> {
        None
    }
}

pub trait JsonProbe {
    type Value;

    fn json_capability(&self) -> Option<UnmarshalFn<Self::Value>>;
}

impl<T: UnmarshalJson> JsonProbe for Probe<T> {
    type Value = T;

    fn json_capability(&self) -> Option<UnmarshalFn<T>> {
        Some(T::unmarshal_json as UnmarshalFn<T>)
    }
}

pub trait NoJson {
    type Value;

    fn json_capability(&self) -> Option<UnmarshalFn<Self::Value>>;
}

impl<T> NoJson for &Probe<T> {
    type Value = T;

    fn json_capability(&self) -> Option<UnmarshalFn<T>> {
        None
    }
}

pub trait ScanSequenceProbe {
    type Value;

    fn scan_sequence_capability(&self) -> Option<CoerceFn<Self::Value>>;
}

impl<T: Scan + Default> ScanSequenceProbe for Probe<Vec<T>> {
    type Value = Vec<T>;

    fn scan_sequence_capability(&self) -> Option<CoerceFn<Vec<T>>> {
        Some(scan_sequence::<T> as CoerceFn<Vec<T>>)
    }
}

pub trait NoScanSequence {
    type Value;

    fn scan_sequence_capability(&self) -> Option<CoerceFn<Self::Value>>;
}

impl<T> NoScanSequence for &Probe<T> {
    type Value = T;

    fn scan_sequence_capability(&self) -> Option<CoerceFn<T>> {
        None
    }
}

pub trait TextSequenceProbe {
    type Value;

    fn text_sequence_capability(&self) -> Option<DecodeFn<Self::Value>>;
}

impl<T: UnmarshalText + Default> TextSequenceProbe for Probe<Vec<T>> {
    type Value = Vec<T>;

    fn text_sequence_capability(&self) -> Option<DecodeFn<Vec<T>>> {
        Some(text_sequence::<T> as DecodeFn<Vec<T>>)
    }
}

pub trait NoTextSequence {
    type Value;

    fn text_sequence_capability(&self) -> Option<DecodeFn<Self::Value>>;
}

impl<T> NoTextSequence for &Probe<T> {
    type Value = T;

    fn text_sequence_capability(&self) -> Option<DecodeFn<T>> {
        None
    }
}

pub trait JsonSequenceProbe {
    type Value;

    fn json_sequence_capability(&self) -> Option<DecodeFn<Self::Value>>;
}

impl<T: UnmarshalJson + Default> JsonSequenceProbe for Probe<Vec<T>> {
    type Value = Vec<T>;

    fn json_sequence_capability(&self) -> Option<DecodeFn<Vec<T>>> {
        Some(json_sequence::<T> as DecodeFn<Vec<T>>)
    }
}

pub trait NoJsonSequence {
    type Value;

    fn json_sequence_capability(&self) -> Option<DecodeFn<Self::Value>>;
}

impl<T> NoJsonSequence for &Probe<T> {
    type Value = T;

    fn json_sequence_capability(&self) -> Option<DecodeFn<T>> {
        None
    }
}

pub trait CoerceProbe {
    type Value;

    fn coerce_capability(&self) -> Option<CoerceFn<Self::Value>>;
}

impl<T: Coerce> CoerceProbe for Probe<T> {
    type Value = T;

    fn coerce_capability(&self) -> Option<CoerceFn<T>> {
        Some(T::coerce as CoerceFn<T>)
    }
}

pub trait NoCoerce {
    type Value;

    fn coerce_capability(&self) -> Option<CoerceFn<Self::Value>>;
}

impl<T> NoCoerce for &Probe<T> {
    type Value = T;

    fn coerce_capability(&self) -> Option<CoerceFn<T>> {
        None
    }
}
