use std::rc::Rc;

pub type ViewId = u64;

pub type Callback = Rc<dyn Fn()>;

#[derive(Clone)]
pub enum ViewKind {
    Group,
    Row,
    Column,
    Text {
        text: String,
    },
    Button {
        label: String,
        on_click: Option<Callback>,
    },
}

impl std::fmt::Debug for ViewKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewKind::Group => write!(f, "Group"),
            ViewKind::Row => write!(f, "Row"),
            ViewKind::Column => write!(f, "Column"),
            ViewKind::Text { text } => f.debug_struct("Text").field("text", text).finish(),
            ViewKind::Button { label, .. } => f
                .debug_struct("Button")
                .field("label", label)
                .field("on_click", &"<callback>")
                .finish(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct View {
    pub id: ViewId,
    pub kind: ViewKind,
    pub children: Vec<View>,
}

impl View {
    pub fn new(kind: ViewKind) -> Self {
        View {
            id: 0,
            kind,
            children: vec![],
        }
    }

    pub fn id(mut self, id: ViewId) -> Self {
        self.id = id;
        self
    }

    pub fn child(mut self, v: View) -> Self {
        self.children.push(v);
        self
    }

    pub fn with_children(mut self, kids: Vec<View>) -> Self {
        self.children = kids;
        self
    }
}
