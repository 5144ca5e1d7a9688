//! Indirect Object Registry
//!
//! Every object that is referenced by id lives here. An id is handed out
//! only when an object is promoted (or an id is reserved for a forward
//! reference); plain objects built with [`PdfObject`] constructors carry no
//! identity. Ids start at 1; id 0 is the head of the free list.

use crate::error::{PdfError, Result};
use crate::structure::{DictionaryKind, StructureDictionary};
use crate::xref::{CrossReferenceTable, XrefLocation, MAX_GENERATION};
use crate::{ObjectRef, PdfObject};
use std::collections::BTreeMap;

/// An object together with its identity
#[derive(Debug, Clone)]
pub struct IndirectObject {
    reference: ObjectRef,
    /// None while only reserved
    object: Option<PdfObject>,
    /// Schedule the object is validated against, if it is a structure dictionary
    kind: Option<DictionaryKind>,
    /// Set once the object has been written
    offset: Option<u64>,
}

impl IndirectObject {
    pub fn reference(&self) -> ObjectRef {
        self.reference
    }

    pub fn object(&self) -> Option<&PdfObject> {
        self.object.as_ref()
    }

    pub fn kind(&self) -> Option<DictionaryKind> {
        self.kind
    }

    pub fn offset(&self) -> Option<u64> {
        self.offset
    }

    pub fn is_defined(&self) -> bool {
        self.object.is_some()
    }
}

/// Registry of the indirect objects of one document
#[derive(Debug, Clone)]
pub struct ObjectRegistry {
    objects: BTreeMap<u32, IndirectObject>,
    /// Freed ids and the generation they carry on reuse
    free: BTreeMap<u32, u16>,
    next_id: u32,
}

impl Default for ObjectRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self {
            objects: BTreeMap::new(),
            free: BTreeMap::new(),
            next_id: 1,
        }
    }

    fn acquire(&mut self) -> ObjectRef {
        let reusable = self
            .free
            .iter()
            .find(|(_, generation)| **generation < MAX_GENERATION)
            .map(|(id, generation)| (*id, *generation));

        match reusable {
            Some((id, generation)) => {
                self.free.remove(&id);
                ObjectRef::new(id, generation)
            }
            None => {
                let id = self.next_id;
                self.next_id += 1;
                ObjectRef::new(id, 0)
            }
        }
    }

    fn insert(&mut self, reference: ObjectRef, object: Option<PdfObject>, kind: Option<DictionaryKind>) {
        tracing::trace!(%reference, ?kind, "object promoted");
        self.objects.insert(
            reference.id,
            IndirectObject {
                reference,
                object,
                kind,
                offset: None,
            },
        );
    }

    /// Give `object` an identity
    pub fn promote(&mut self, object: impl Into<PdfObject>) -> ObjectRef {
        let reference = self.acquire();
        self.insert(reference, Some(object.into()), None);
        reference
    }

    /// Give a structure dictionary an identity; it is validated at write time
    pub fn promote_structure(&mut self, structure: StructureDictionary) -> ObjectRef {
        let reference = self.acquire();
        let (kind, dict) = structure.into_parts();
        self.insert(reference, Some(PdfObject::Dictionary(dict)), Some(kind));
        reference
    }

    /// Acquire an id whose value is supplied later with [`define`](Self::define)
    pub fn reserve(&mut self) -> ObjectRef {
        let reference = self.acquire();
        self.insert(reference, None, None);
        reference
    }

    /// Supply the value of a reserved id. A value can be given only once.
    pub fn define(&mut self, reference: ObjectRef, object: impl Into<PdfObject>) -> Result<()> {
        self.define_inner(reference, object.into(), None)
    }

    /// Supply a structure dictionary for a reserved id
    pub fn define_structure(
        &mut self,
        reference: ObjectRef,
        structure: StructureDictionary,
    ) -> Result<()> {
        let (kind, dict) = structure.into_parts();
        self.define_inner(reference, PdfObject::Dictionary(dict), Some(kind))
    }

    fn define_inner(
        &mut self,
        reference: ObjectRef,
        object: PdfObject,
        kind: Option<DictionaryKind>,
    ) -> Result<()> {
        let slot = self.slot_mut(reference)?;
        if slot.object.is_some() {
            return Err(PdfError::ObjectAlreadyWritten(reference));
        }
        slot.object = Some(object);
        slot.kind = kind;
        Ok(())
    }

    /// Release an object. Its id becomes reusable with the next generation.
    pub fn free(&mut self, reference: ObjectRef) -> Result<()> {
        let slot = self.slot(reference)?;
        if slot.offset.is_some() {
            return Err(PdfError::ObjectAlreadyWritten(reference));
        }
        self.objects.remove(&reference.id);
        self.free
            .insert(reference.id, reference.generation.saturating_add(1));
        tracing::trace!(%reference, "object freed");
        Ok(())
    }

    fn slot(&self, reference: ObjectRef) -> Result<&IndirectObject> {
        self.objects
            .get(&reference.id)
            .filter(|o| o.reference == reference)
            .ok_or(PdfError::UnknownObject(reference))
    }

    fn slot_mut(&mut self, reference: ObjectRef) -> Result<&mut IndirectObject> {
        self.objects
            .get_mut(&reference.id)
            .filter(|o| o.reference == reference)
            .ok_or(PdfError::UnknownObject(reference))
    }

    /// The indirect object behind `reference`
    pub fn get(&self, reference: ObjectRef) -> Option<&IndirectObject> {
        self.slot(reference).ok()
    }

    /// The defined value behind `reference`
    pub fn object(&self, reference: ObjectRef) -> Option<&PdfObject> {
        self.get(reference).and_then(IndirectObject::object)
    }

    /// Mutable access to a defined value; refused once the object was written
    pub fn get_mut(&mut self, reference: ObjectRef) -> Result<&mut PdfObject> {
        let slot = self.slot_mut(reference)?;
        if slot.offset.is_some() {
            return Err(PdfError::ObjectAlreadyWritten(reference));
        }
        slot.object
            .as_mut()
            .ok_or(PdfError::UndefinedObject(reference))
    }

    /// Record where the object starts in the output.
    ///
    /// Recording the same offset again is accepted so that an unchanged graph
    /// can be written more than once.
    pub fn record_offset(&mut self, reference: ObjectRef, offset: u64) -> Result<()> {
        let slot = self.slot_mut(reference)?;
        match slot.offset {
            Some(existing) if existing != offset => Err(PdfError::ObjectAlreadyWritten(reference)),
            _ => {
                slot.offset = Some(offset);
                tracing::trace!(%reference, offset, "offset recorded");
                Ok(())
            }
        }
    }

    /// Live objects in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = &IndirectObject> {
        self.objects.values()
    }

    /// References of structure dictionaries of the given kind
    pub fn references_of_kind(&self, kind: DictionaryKind) -> Vec<ObjectRef> {
        self.objects
            .values()
            .filter(|o| o.kind == Some(kind))
            .map(|o| o.reference)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Ids released by [`free`](Self::free) and not reused since
    pub fn free_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.free.keys().copied()
    }

    /// Build the cross-reference table from the recorded offsets
    pub fn cross_reference_table(&self) -> Result<CrossReferenceTable> {
        let mut table = CrossReferenceTable::new();
        for object in self.objects.values() {
            if object.object.is_none() {
                return Err(PdfError::UndefinedObject(object.reference));
            }
            let offset = object.offset.ok_or_else(|| {
                PdfError::InvalidDocument(format!("object {} was never written", object.reference))
            })?;
            table.add_entry(
                object.reference.id,
                XrefLocation::InUse(offset),
                object.reference.generation,
            );
        }
        for (id, generation) in &self.free {
            table.add_entry(*id, XrefLocation::NextFree(0), *generation);
        }
        table.relink_free_list();
        Ok(table)
    }
}
