//! Pending resource requests.
//!
//! Media nodes are created without a source. Instead of reaching for a
//! platform file picker, the editor queues a [`ResourceRequest`] naming the
//! node and the field that needs a reference. The host drains the queue,
//! obtains the resource however it likes, and hands the resulting
//! reference back; it is committed through the normal write path.

use pd_core::document::Document;
use pd_core::id::NodeId;
use pd_core::model::{Node, NodeKind};
use pd_core::patch::AttrPatch;
use serde::{Deserialize, Serialize};

/// Which attribute a resolved resource fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceField {
    /// `src` of an image or video.
    Src,
    /// Card `image`.
    Image,
    ProfileImage,
    /// Appends to a carousel's `images`.
    CarouselImages,
}

impl ResourceField {
    /// Serialized attribute name the field writes.
    pub fn attribute(self) -> &'static str {
        match self {
            ResourceField::Src => "src",
            ResourceField::Image => "image",
            ResourceField::ProfileImage => "profileImage",
            ResourceField::CarouselImages => "images",
        }
    }

    /// Whether a request for this field makes sense on `node`.
    pub fn applies_to(self, node: &Node) -> bool {
        matches!(
            (self, &node.kind),
            (ResourceField::Src, NodeKind::Image(_) | NodeKind::Video(_))
                | (ResourceField::Image, NodeKind::Card(_))
                | (ResourceField::ProfileImage, NodeKind::ProfileCard(_))
                | (ResourceField::CarouselImages, NodeKind::Carousel(_))
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRequest {
    pub node: NodeId,
    pub field: ResourceField,
}

impl ResourceRequest {
    /// The request a freshly created node needs, if its source is empty.
    pub fn for_node(node: &Node) -> Option<Self> {
        let field = match &node.kind {
            NodeKind::Image(p) if p.src.is_none() => ResourceField::Src,
            NodeKind::Video(p) if p.src.is_none() => ResourceField::Src,
            NodeKind::Card(p) if p.image.is_none() => ResourceField::Image,
            NodeKind::ProfileCard(p) if p.profile_image.is_none() => ResourceField::ProfileImage,
            _ => return None,
        };
        Some(Self {
            node: node.id,
            field,
        })
    }
}

/// How a resolved resource is committed.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Patch(AttrPatch),
    AppendImages(Vec<String>),
}

/// Turn resolved references into a commit. Single-valued fields take the
/// first reference; `None` when there is nothing to commit.
pub fn resolve(request: ResourceRequest, urls: Vec<String>) -> Option<Resolution> {
    match request.field {
        ResourceField::CarouselImages if !urls.is_empty() => Some(Resolution::AppendImages(urls)),
        ResourceField::CarouselImages => None,
        field => {
            let url = urls.into_iter().next()?;
            Some(Resolution::Patch(AttrPatch::new().set(field.attribute(), url)))
        }
    }
}

/// FIFO queue of outstanding requests, deduplicated.
#[derive(Debug, Clone, Default)]
pub struct ResourceRequests {
    queue: Vec<ResourceRequest>,
}

impl ResourceRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `request` unless an identical one is pending.
    pub fn push(&mut self, request: ResourceRequest) -> bool {
        if self.queue.contains(&request) {
            return false;
        }
        log::debug!("resource needed: {:?} for {}", request.field, request.node);
        self.queue.push(request);
        true
    }

    pub fn pending(&self) -> &[ResourceRequest] {
        &self.queue
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Hand every pending request to the host.
    pub fn drain(&mut self) -> Vec<ResourceRequest> {
        std::mem::take(&mut self.queue)
    }

    /// Drop a request once it has been answered.
    pub fn complete(&mut self, request: ResourceRequest) {
        self.queue.retain(|r| *r != request);
    }

    /// Drop requests whose node is gone.
    pub fn retain_present(&mut self, doc: &Document) {
        self.queue.retain(|r| doc.contains(r.node));
    }
}
