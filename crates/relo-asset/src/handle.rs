//! Typed asset handles
//!
//! Defines [`AssetHandle<T>`], a loaded asset bound to the identifier it was
//! loaded from, and the sealed [`AssetClass`] trait that types it.

use crate::document::{AssetDocument, Blob, MaterialDoc, ModelDoc};
use crate::path::AssetId;
use crate::store::{AssetStore, StoreError};
use std::fmt::Debug;
use std::marker::PhantomData;

/// Trait for asset classes a handle can be typed over
///
/// This trait is **sealed** - only the classes in this module implement it.
pub trait AssetClass: Debug + 'static + private::Sealed {
    /// Loaded content for this class
    type Content: Debug + Clone + PartialEq;

    /// Class identifier used in error messages
    const CLASS_ID: &'static str;

    /// Narrow a document to this class
    fn from_document(doc: AssetDocument) -> Option<Self::Content>;

    /// Widen content back into a document
    fn into_document(content: Self::Content) -> AssetDocument;
}

/// Sealed trait - prevents external implementations
#[doc(hidden)]
pub mod private {
    /// Sealed trait marker
    pub trait Sealed {}
}

/// Model/prefab documents
#[derive(Debug, Clone, Copy)]
pub struct ModelAsset;

/// Material documents
#[derive(Debug, Clone, Copy)]
pub struct MaterialAsset;

/// Opaque byte assets (textures, meshes, shaders, scripts)
#[derive(Debug, Clone, Copy)]
pub struct BlobAsset;

/// Any document
#[derive(Debug, Clone, Copy)]
pub struct AnyAsset;

impl private::Sealed for ModelAsset {}
impl private::Sealed for MaterialAsset {}
impl private::Sealed for BlobAsset {}
impl private::Sealed for AnyAsset {}

impl AssetClass for ModelAsset {
    type Content = ModelDoc;
    const CLASS_ID: &'static str = "model";

    fn from_document(doc: AssetDocument) -> Option<Self::Content> {
        match doc {
            AssetDocument::Model(model) => Some(model),
            _ => None,
        }
    }

    fn into_document(content: Self::Content) -> AssetDocument {
        AssetDocument::Model(content)
    }
}

impl AssetClass for MaterialAsset {
    type Content = MaterialDoc;
    const CLASS_ID: &'static str = "material";

    fn from_document(doc: AssetDocument) -> Option<Self::Content> {
        match doc {
            AssetDocument::Material(material) => Some(material),
            _ => None,
        }
    }

    fn into_document(content: Self::Content) -> AssetDocument {
        AssetDocument::Material(content)
    }
}

impl AssetClass for BlobAsset {
    type Content = Blob;
    const CLASS_ID: &'static str = "blob";

    fn from_document(doc: AssetDocument) -> Option<Self::Content> {
        match doc {
            AssetDocument::Blob(blob) => Some(blob),
            _ => None,
        }
    }

    fn into_document(content: Self::Content) -> AssetDocument {
        AssetDocument::Blob(content)
    }
}

impl AssetClass for AnyAsset {
    type Content = AssetDocument;
    const CLASS_ID: &'static str = "any";

    fn from_document(doc: AssetDocument) -> Option<Self::Content> {
        Some(doc)
    }

    fn into_document(content: Self::Content) -> AssetDocument {
        content
    }
}

/// Errors related to handle operations
#[derive(Debug, thiserror::Error)]
pub enum HandleError {
    /// Underlying store failure
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Stored document is not of the requested class
    #[error("asset {id} is not a {expected} asset")]
    WrongClass { id: AssetId, expected: &'static str },
}

/// Live, typed reference to a loaded asset
///
/// # Type Parameters
/// - `T`: The asset class (model, material, blob, any)
///
/// Several handles may alias the same identifier; each owns its own copy of
/// the content until saved.
#[derive(Debug)]
pub struct AssetHandle<T: AssetClass> {
    id: AssetId,
    content: T::Content,
    _phantom: PhantomData<T>,
}

impl<T: AssetClass> Clone for AssetHandle<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            content: self.content.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<T: AssetClass> PartialEq for AssetHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.content == other.content
    }
}

impl<T: AssetClass> AssetHandle<T> {
    /// Bind content to an identifier without touching a store
    #[inline]
    #[must_use]
    pub fn new(id: AssetId, content: T::Content) -> Self {
        Self {
            id,
            content,
            _phantom: PhantomData,
        }
    }

    /// Load `id` from `store`
    ///
    /// # Errors
    /// - `HandleError::Store` if loading fails
    /// - `HandleError::WrongClass` if the document is of another class
    pub fn load<S: AssetStore + ?Sized>(store: &S, id: &AssetId) -> Result<Self, HandleError> {
        let doc = store.load(id)?;
        let content = T::from_document(doc).ok_or_else(|| HandleError::WrongClass {
            id: id.clone(),
            expected: T::CLASS_ID,
        })?;
        Ok(Self::new(id.clone(), content))
    }

    /// Write the content back to its identifier
    ///
    /// # Errors
    /// Returns error if the store rejects the document
    pub fn save<S: AssetStore + ?Sized>(&self, store: &mut S) -> Result<(), StoreError> {
        store.save(&self.id, &T::into_document(self.content.clone()))
    }

    /// Identifier this handle is bound to
    #[inline]
    #[must_use]
    pub fn id(&self) -> &AssetId {
        &self.id
    }

    /// Reference to content
    #[inline]
    #[must_use]
    pub fn content(&self) -> &T::Content {
        &self.content
    }

    /// Mutable reference to content
    #[inline]
    pub fn content_mut(&mut self) -> &mut T::Content {
        &mut self.content
    }

    /// Move content out of the handle
    #[inline]
    #[must_use]
    pub fn into_content(self) -> T::Content {
        self.content
    }

    /// Drop the static class
    #[must_use]
    pub fn erase(self) -> AssetHandle<AnyAsset> {
        AssetHandle::new(self.id, T::into_document(self.content))
    }

    /// Class identifier
    #[inline]
    #[must_use]
    pub fn class_id() -> &'static str {
        T::CLASS_ID
    }
}

impl AssetHandle<AnyAsset> {
    /// Narrow to a concrete class
    ///
    /// # Errors
    /// Returns `HandleError::WrongClass` if the document is of another class
    pub fn downcast<U: AssetClass>(self) -> Result<AssetHandle<U>, HandleError> {
        let id = self.id;
        match U::from_document(self.content) {
            Some(content) => Ok(AssetHandle::new(id, content)),
            None => Err(HandleError::WrongClass {
                id,
                expected: U::CLASS_ID,
            }),
        }
    }
}
