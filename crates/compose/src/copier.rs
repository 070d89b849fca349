//! Deep object copying between documents with cycle-safe reference
//! remapping. Each source document keeps one id map for the whole
//! composition so shared resources are copied once.

use lopdf::{Document, Object, ObjectId};
use std::collections::HashMap;

pub(crate) struct ObjectCopier<'a> {
    source: &'a Document,
    target: &'a mut Document,
    id_map: &'a mut HashMap<ObjectId, ObjectId>,
}

impl<'a> ObjectCopier<'a> {
    pub fn new(
        source: &'a Document,
        target: &'a mut Document,
        id_map: &'a mut HashMap<ObjectId, ObjectId>,
    ) -> Self {
        Self {
            source,
            target,
            id_map,
        }
    }

    /// Copies an object and everything it references, returning its new
    /// id. The new id is registered in the map before recursing so
    /// cyclical references (Page -> Parent -> Kids -> Page) terminate.
    pub fn copy_object(&mut self, source_id: ObjectId) -> Result<ObjectId, lopdf::Error> {
        if let Some(target_id) = self.id_map.get(&source_id) {
            return Ok(*target_id);
        }

        let new_id = self.target.add_object(Object::Null);
        self.id_map.insert(source_id, new_id);

        let obj = self.source.get_object(source_id)?.clone();
        let new_obj = self.remap_references(obj)?;

        match self.target.objects.get_mut(&new_id) {
            Some(slot) => *slot = new_obj,
            None => return Err(lopdf::Error::ObjectNotFound(new_id)),
        }
        Ok(new_id)
    }

    /// Replaces every reference inside `obj` with a reference into the
    /// target document, copying referenced objects on demand.
    pub fn remap_references(&mut self, obj: Object) -> Result<Object, lopdf::Error> {
        match obj {
            Object::Reference(id) => Ok(Object::Reference(self.copy_object(id)?)),
            Object::Array(arr) => {
                let new_arr = arr
                    .into_iter()
                    .map(|o| self.remap_references(o))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Object::Array(new_arr))
            }
            Object::Dictionary(mut dict) => {
                for (_, value) in dict.iter_mut() {
                    *value = self.remap_references(value.clone())?;
                }
                Ok(Object::Dictionary(dict))
            }
            Object::Stream(mut stream) => {
                for (_, value) in stream.dict.iter_mut() {
                    *value = self.remap_references(value.clone())?;
                }
                Ok(Object::Stream(stream))
            }
            _ => Ok(obj),
        }
    }
}

/// Merges an overlay resource dictionary into a page's resource
/// dictionary. Sub-dictionaries (Font, XObject, ...) merge key-wise; on
/// a name collision the page's own entry wins.
pub(crate) fn merge_resources(base: &mut lopdf::Dictionary, overlay: lopdf::Dictionary) {
    for (key, value) in overlay.into_iter() {
        if !base.has(&key) {
            base.set(key, value);
            continue;
        }
        let Object::Dictionary(overlay_sub) = value else {
            continue;
        };
        if let Ok(Object::Dictionary(base_sub)) = base.get_mut(&key) {
            for (k, v) in overlay_sub.into_iter() {
                if !base_sub.has(&k) {
                    base_sub.set(k, v);
                }
            }
        }
    }
}
